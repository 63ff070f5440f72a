use serde::{Deserialize, Serialize};
use std::fmt;

/// Статус остатка, вычисляемый при чтении
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
    Expired,
    Damaged,
}

impl StockStatus {
    pub const ALL: [StockStatus; 5] = [
        StockStatus::InStock,
        StockStatus::LowStock,
        StockStatus::OutOfStock,
        StockStatus::Expired,
        StockStatus::Damaged,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
            StockStatus::Expired => "expired",
            StockStatus::Damaged => "damaged",
        }
    }

    /// Подпись для карточек и таблиц
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
            StockStatus::Expired => "Expired",
            StockStatus::Damaged => "Damaged",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL.into_iter().find(|s| s.code() == normalized)
    }

    pub fn severity(&self) -> Severity {
        match self {
            StockStatus::InStock => Severity::Success,
            StockStatus::LowStock => Severity::Warning,
            StockStatus::OutOfStock | StockStatus::Expired | StockStatus::Damaged => {
                Severity::Danger
            }
        }
    }

    /// Требует внимания оператора
    pub fn is_urgent(&self) -> bool {
        !matches!(self, StockStatus::InStock)
    }

    pub fn ordinal(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(Self::ALL.len())
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Уровень важности статуса
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Danger,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_accepts_labels() {
        assert_eq!(StockStatus::from_code("Low Stock"), Some(StockStatus::LowStock));
        assert_eq!(StockStatus::from_code("out-of-stock"), Some(StockStatus::OutOfStock));
        assert_eq!(StockStatus::from_code("expired"), Some(StockStatus::Expired));
        assert_eq!(StockStatus::from_code("lost"), None);
    }

    #[test]
    fn test_only_in_stock_is_not_urgent() {
        for status in StockStatus::ALL {
            assert_eq!(status.is_urgent(), status != StockStatus::InStock);
        }
    }
}
