pub mod a001_inventory_item;
pub mod a002_campus;
pub mod a003_health_request;
pub mod a004_laptop_submission;
pub mod a005_laptop_return;
pub mod a006_notification;
