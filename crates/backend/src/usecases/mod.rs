pub mod u501_restock_recommendation;
pub mod u502_admin_message;
