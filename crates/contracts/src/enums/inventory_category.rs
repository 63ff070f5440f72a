use serde::{Deserialize, Serialize};
use std::fmt;

/// Категории инвентаря
///
/// Каждая категория хранится в своей коллекции и имеет свой порог
/// "Low Stock".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryCategory {
    It,
    Food,
    Health,
    OfficeSupplies,
    Furniture,
}

impl InventoryCategory {
    /// Все категории в порядке отображения
    pub const ALL: [InventoryCategory; 5] = [
        InventoryCategory::It,
        InventoryCategory::Food,
        InventoryCategory::Health,
        InventoryCategory::OfficeSupplies,
        InventoryCategory::Furniture,
    ];

    /// Получить код категории
    pub fn code(&self) -> &'static str {
        match self {
            InventoryCategory::It => "it",
            InventoryCategory::Food => "food",
            InventoryCategory::Health => "health",
            InventoryCategory::OfficeSupplies => "office_supplies",
            InventoryCategory::Furniture => "furniture",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            InventoryCategory::It => "IT",
            InventoryCategory::Food => "Food",
            InventoryCategory::Health => "Health",
            InventoryCategory::OfficeSupplies => "Office Supplies",
            InventoryCategory::Furniture => "Furniture",
        }
    }

    /// Парсинг из строки (код или название, без учета регистра)
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "it" => Some(InventoryCategory::It),
            "food" => Some(InventoryCategory::Food),
            "health" => Some(InventoryCategory::Health),
            "office_supplies" => Some(InventoryCategory::OfficeSupplies),
            "furniture" => Some(InventoryCategory::Furniture),
            _ => None,
        }
    }

    /// Порог "Low Stock" по умолчанию (включительно)
    pub fn default_low_stock_threshold(&self) -> u32 {
        match self {
            InventoryCategory::It | InventoryCategory::Furniture => 2,
            InventoryCategory::OfficeSupplies => 5,
            InventoryCategory::Food | InventoryCategory::Health => 10,
        }
    }

    /// Категории с физическим состоянием (можно пометить как Damaged)
    pub fn tracks_condition(&self) -> bool {
        matches!(self, InventoryCategory::It | InventoryCategory::Furniture)
    }

    /// Категории со сроком годности
    pub fn is_perishable(&self) -> bool {
        matches!(self, InventoryCategory::Food | InventoryCategory::Health)
    }

    /// Позиция в порядке отображения
    pub fn ordinal(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(Self::ALL.len())
    }
}

impl fmt::Display for InventoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
