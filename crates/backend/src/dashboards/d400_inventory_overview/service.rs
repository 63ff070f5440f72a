use chrono::NaiveDate;
use contracts::dashboards::d400_inventory_overview::{
    CategoryCount, InventoryOverview, StatusCount, UrgentPreview,
};
use contracts::domain::a001_inventory_item::TaggedItem;
use contracts::enums::{InventoryCategory, StockStatus};

use crate::shared::app_state::AppState;
use crate::shared::error::AppError;

/// round(count / total * 100), 0 для пустого списка
fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u32
}

fn urgent(
    items: &[TaggedItem],
    preview: usize,
    pred: impl Fn(StockStatus) -> bool,
) -> UrgentPreview {
    let matching: Vec<&TaggedItem> = items.iter().filter(|t| pred(t.status)).collect();
    let shown: Vec<TaggedItem> = matching.iter().take(preview).map(|t| (*t).clone()).collect();
    UrgentPreview {
        total: matching.len(),
        more: matching.len() - shown.len(),
        preview: shown,
    }
}

/// Сводка по уже размеченным записям.
///
/// Категории и статусы считаются по количеству записей, а не по единицам
/// товара. Порядок: по убыванию count, при равенстве порядок объявления.
pub fn aggregate(items: &[TaggedItem], preview: usize) -> InventoryOverview {
    let total = items.len();

    let mut category_counts = [0usize; InventoryCategory::ALL.len()];
    let mut status_counts = [0usize; StockStatus::ALL.len()];
    for t in items {
        category_counts[t.item.category.ordinal()] += 1;
        status_counts[t.status.ordinal()] += 1;
    }

    let mut per_category: Vec<CategoryCount> = InventoryCategory::ALL
        .iter()
        .map(|c| CategoryCount {
            category: *c,
            label: c.display_name().to_string(),
            count: category_counts[c.ordinal()],
            percent: percent(category_counts[c.ordinal()], total),
        })
        .collect();
    // sort_by стабильна, ничьи остаются в порядке объявления
    per_category.sort_by(|a, b| b.count.cmp(&a.count));

    let mut per_status: Vec<StatusCount> = StockStatus::ALL
        .iter()
        .map(|s| StatusCount {
            status: *s,
            label: s.label().to_string(),
            count: status_counts[s.ordinal()],
            percent: percent(status_counts[s.ordinal()], total),
        })
        .collect();
    per_status.sort_by(|a, b| b.count.cmp(&a.count));

    InventoryOverview {
        total,
        per_category,
        per_status,
        urgent_low_stock: urgent(items, preview, |s| s == StockStatus::LowStock),
        urgent_out_of_stock: urgent(items, preview, |s| s == StockStatus::OutOfStock),
        urgent_disposal: urgent(items, preview, |s| {
            matches!(s, StockStatus::Expired | StockStatus::Damaged)
        }),
        campus_ref: None,
    }
}

/// Сводка главного дашборда, опционально по одному кампусу
pub async fn get_overview(
    state: &AppState,
    campus_ref: Option<String>,
    today: NaiveDate,
) -> Result<InventoryOverview, AppError> {
    let mut items = state.tagged_items(today).await?;
    if let Some(campus) = campus_ref.as_deref() {
        items.retain(|t| t.item.campus_ref.as_deref() == Some(campus));
    }
    let mut overview = aggregate(&items, state.config.inventory.preview_count);
    overview.campus_ref = campus_ref;
    tracing::debug!("Overview built over {} items", overview.total);
    Ok(overview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_inventory_item::{InventoryItem, ItemCondition, LowStockThresholds};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn tagged(category: InventoryCategory, name: &str, quantity: u32) -> TaggedItem {
        let mut item = InventoryItem::new_for_insert(category, name, quantity);
        item.id = name.to_lowercase();
        TaggedItem::tag(item, today(), &LowStockThresholds::default())
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let overview = aggregate(&[], 3);
        assert_eq!(overview.total, 0);
        assert_eq!(overview.per_category.len(), 5);
        assert!(overview.per_category.iter().all(|c| c.count == 0 && c.percent == 0));
        assert_eq!(overview.urgent_low_stock.total, 0);
        assert_eq!(overview.urgent_low_stock.more, 0);
        // ничьи в порядке объявления
        assert_eq!(overview.per_category[0].category, InventoryCategory::It);
    }

    #[test]
    fn test_category_counts_sum_to_total() {
        let items = vec![
            tagged(InventoryCategory::Food, "Rice", 40),
            tagged(InventoryCategory::Food, "Beans", 3),
            tagged(InventoryCategory::OfficeSupplies, "Printer Paper", 100),
            tagged(InventoryCategory::It, "HDMI Cable", 0),
        ];
        let overview = aggregate(&items, 3);
        let sum: usize = overview.per_category.iter().map(|c| c.count).sum();
        assert_eq!(sum, overview.total);
        assert_eq!(overview.per_category[0].category, InventoryCategory::Food);
        assert_eq!(overview.per_category[0].percent, 50);
        assert_eq!(overview.per_category[1].category, InventoryCategory::It);
        assert_eq!(overview.per_category[1].percent, 25);
        assert_eq!(overview.urgent_low_stock.total, 1);
        assert_eq!(overview.urgent_out_of_stock.total, 1);
    }

    #[test]
    fn test_percent_rounds() {
        let items = vec![
            tagged(InventoryCategory::Food, "Rice", 40),
            tagged(InventoryCategory::Food, "Beans", 40),
            tagged(InventoryCategory::Health, "Paracetamol", 40),
        ];
        let overview = aggregate(&items, 3);
        assert_eq!(overview.per_category[0].percent, 67);
        assert_eq!(overview.per_category[1].percent, 33);
    }

    #[test]
    fn test_urgent_preview_reports_more() {
        let mut items: Vec<TaggedItem> = (1..=5)
            .map(|i| tagged(InventoryCategory::OfficeSupplies, &format!("Pens {}", i), 2))
            .collect();
        let mut chair = InventoryItem::new_for_insert(InventoryCategory::Furniture, "Chair", 20);
        chair.condition = ItemCondition::Damaged;
        items.push(TaggedItem::tag(chair, today(), &LowStockThresholds::default()));

        let overview = aggregate(&items, 3);
        assert_eq!(overview.urgent_low_stock.preview.len(), 3);
        assert_eq!(overview.urgent_low_stock.total, 5);
        assert_eq!(overview.urgent_low_stock.more, 2);
        assert_eq!(overview.urgent_disposal.total, 1);
        assert_eq!(overview.urgent_disposal.more, 0);
    }
}
