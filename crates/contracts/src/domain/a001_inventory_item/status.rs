//! Правила вычисления статуса остатка.
//!
//! Статус никогда не хранится как источник истины: он всегда считается
//! при чтении из количества, срока годности и состояния.

use super::aggregate::{InventoryItem, ItemCondition};
use crate::enums::{InventoryCategory, Severity, StockStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub status: StockStatus,
    pub severity: Severity,
}

impl StatusInfo {
    fn of(status: StockStatus) -> Self {
        Self {
            status,
            severity: status.severity(),
        }
    }
}

/// Статус по количеству и сроку годности. Первое совпадение побеждает:
/// 1. `quantity == 0` -> Out of Stock (даже если срок истек)
/// 2. `quantity <= threshold` -> Low Stock (граница включительно)
/// 3. срок годности раньше `today` -> Expired
/// 4. иначе In Stock
pub fn derive_status(
    quantity: u32,
    expiry_date: Option<NaiveDate>,
    today: NaiveDate,
    threshold: u32,
) -> StatusInfo {
    if quantity == 0 {
        return StatusInfo::of(StockStatus::OutOfStock);
    }
    if quantity <= threshold {
        return StatusInfo::of(StockStatus::LowStock);
    }
    match expiry_date {
        Some(expiry) if expiry < today => StatusInfo::of(StockStatus::Expired),
        _ => StatusInfo::of(StockStatus::InStock),
    }
}

/// Статус записи с учетом отметки Damaged.
///
/// Damaged ставится пользователем и перекрывает вычисленный статус,
/// но только для категорий с физическим состоянием.
pub fn effective_status(item: &InventoryItem, today: NaiveDate, threshold: u32) -> StatusInfo {
    if item.condition == ItemCondition::Damaged && item.category.tracks_condition() {
        return StatusInfo::of(StockStatus::Damaged);
    }
    derive_status(item.quantity, item.expiry_date, today, threshold)
}

/// Пороги "Low Stock" по категориям
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LowStockThresholds {
    overrides: HashMap<InventoryCategory, u32>,
}

impl LowStockThresholds {
    pub fn with_overrides(overrides: HashMap<InventoryCategory, u32>) -> Self {
        Self { overrides }
    }

    pub fn for_category(&self, category: InventoryCategory) -> u32 {
        self.overrides
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_low_stock_threshold())
    }

    pub fn status_of(&self, item: &InventoryItem, today: NaiveDate) -> StatusInfo {
        effective_status(item, today, self.for_category(item.category))
    }
}

/// Запись вместе с вычисленным статусом (то, что видит дашборд)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedItem {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub status: StockStatus,
    pub status_label: String,
    pub severity: Severity,
}

impl TaggedItem {
    pub fn tag(item: InventoryItem, today: NaiveDate, thresholds: &LowStockThresholds) -> Self {
        let info = thresholds.status_of(&item, today);
        Self {
            item,
            status: info.status,
            status_label: info.status.label().to_string(),
            severity: info.severity,
        }
    }

    pub fn tag_all(
        items: impl IntoIterator<Item = InventoryItem>,
        today: NaiveDate,
        thresholds: &LowStockThresholds,
    ) -> Vec<Self> {
        items
            .into_iter()
            .map(|item| Self::tag(item, today, thresholds))
            .collect()
    }
}
