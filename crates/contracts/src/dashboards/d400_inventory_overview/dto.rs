use crate::domain::a001_inventory_item::TaggedItem;
use crate::enums::{InventoryCategory, StockStatus};
use serde::{Deserialize, Serialize};

/// Сводка для карточек и диаграмм главного дашборда
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryOverview {
    /// Количество записей (не единиц товара)
    pub total: usize,
    /// По одной строке на категорию, по убыванию count
    pub per_category: Vec<CategoryCount>,
    /// По одной строке на статус, по убыванию count
    pub per_status: Vec<StatusCount>,
    pub urgent_low_stock: UrgentPreview,
    pub urgent_out_of_stock: UrgentPreview,
    /// Expired + Damaged
    pub urgent_disposal: UrgentPreview,
    /// Кампус, по которому построена сводка (None = все)
    pub campus_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: InventoryCategory,
    pub label: String,
    pub count: usize,
    /// round(count / total * 100), 0 при пустом списке
    pub percent: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: StockStatus,
    pub label: String,
    pub count: usize,
    pub percent: u32,
}

/// Короткий список срочных позиций с "+N more"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrgentPreview {
    pub preview: Vec<TaggedItem>,
    /// Полное количество (для бейджа)
    pub total: usize,
    /// total - preview.len()
    pub more: usize,
}
