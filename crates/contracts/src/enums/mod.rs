pub mod inventory_category;
pub mod stock_status;

pub use inventory_category::InventoryCategory;
pub use stock_status::{Severity, StockStatus};
