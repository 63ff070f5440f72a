//! Inventory Item Domain Module
//!
//! Единая запись инвентаря. В хранилище каждая категория лежит в своей
//! коллекции, на уровне сервиса все категории приводятся к одной форме.

pub mod aggregate;
pub mod status;

pub use aggregate::{ConditionDto, DeductDto, InventoryItem, InventoryItemDto, ItemCondition};
pub use status::{derive_status, effective_status, LowStockThresholds, StatusInfo, TaggedItem};
