pub mod dto;

pub use dto::{CategoryCount, InventoryOverview, StatusCount, UrgentPreview};
