//! Параметры отображения списка инвентаря: фильтры, поиск, сортировка.

use crate::enums::{InventoryCategory, StockStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Quantity,
    Category,
    Expiry,
    Supplier,
}

impl SortKey {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "name" => Some(SortKey::Name),
            "quantity" | "qty" => Some(SortKey::Quantity),
            "category" => Some(SortKey::Category),
            "expiry" | "expiry_date" | "expirydate" => Some(SortKey::Expiry),
            "supplier" => Some(SortKey::Supplier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Состояние фильтров и сортировки.
///
/// `ListViewQuery::default()` означает "все сброшено": без фильтров и в
/// порядке по умолчанию.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListViewQuery {
    #[serde(default)]
    pub categories: BTreeSet<InventoryCategory>,
    #[serde(default)]
    pub statuses: BTreeSet<StockStatus>,
    #[serde(default)]
    pub search: String,
    pub campus_ref: Option<String>,
    pub sort: Option<(SortKey, SortDirection)>,
}

impl ListViewQuery {
    pub fn is_cleared(&self) -> bool {
        *self == Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn with_categories(
        mut self,
        categories: impl IntoIterator<Item = InventoryCategory>,
    ) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = StockStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn sorted_by(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort = Some((key, direction));
        self
    }
}

/// Разобрать список кодов через запятую. Неизвестные коды возвращаются
/// как ошибка, чтобы опечатка не превращалась в пустой фильтр.
pub fn parse_code_list<T: Ord>(
    raw: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<BTreeSet<T>, String> {
    let mut out = BTreeSet::new();
    let Some(raw) = raw else {
        return Ok(out);
    };
    for code in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let value = parse(code).ok_or_else(|| format!("Unknown filter value '{}'", code))?;
        out.insert(value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_code_list() {
        let parsed =
            parse_code_list(Some("it, food,,health"), InventoryCategory::from_code).unwrap();
        assert_eq!(parsed.len(), 3);
        assert!(parsed.contains(&InventoryCategory::Food));

        assert!(parse_code_list(None, StockStatus::from_code).unwrap().is_empty());
        assert!(parse_code_list(Some("expired,gone"), StockStatus::from_code).is_err());
    }

    #[test]
    fn test_clear_restores_default() {
        let mut query = ListViewQuery::default()
            .with_search("paper")
            .sorted_by(SortKey::Quantity, SortDirection::Desc);
        assert!(!query.is_cleared());
        query.clear();
        assert!(query.is_cleared());
    }
}
