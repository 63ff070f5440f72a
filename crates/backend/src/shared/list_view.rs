//! Фильтрация, поиск и сортировка списка инвентаря.

use contracts::domain::a001_inventory_item::TaggedItem;
use contracts::shared::list_view::{ListViewQuery, SortDirection, SortKey};
use std::cmp::Ordering;

/// Применить фильтры и сортировку.
///
/// Пустое множество категорий или статусов означает "без ограничения".
/// Внутри множества условия объединяются через ИЛИ, между множествами
/// через И. Без сортировки сохраняется исходный порядок.
pub fn apply_view(items: &[TaggedItem], query: &ListViewQuery) -> Vec<TaggedItem> {
    let needle = query.search.trim().to_lowercase();
    let campus = query
        .campus_ref
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let mut out: Vec<TaggedItem> = items
        .iter()
        .filter(|t| query.categories.is_empty() || query.categories.contains(&t.item.category))
        .filter(|t| query.statuses.is_empty() || query.statuses.contains(&t.status))
        .filter(|t| needle.is_empty() || t.item.name.to_lowercase().contains(&needle))
        .filter(|t| campus.map_or(true, |c| t.item.campus_ref.as_deref() == Some(c)))
        .cloned()
        .collect();

    if let Some((key, direction)) = query.sort {
        // sort_by is stable
        out.sort_by(|a, b| {
            let ordering = compare(a, b, key);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }
    out
}

fn compare(a: &TaggedItem, b: &TaggedItem, key: SortKey) -> Ordering {
    let (a, b) = (&a.item, &b.item);
    let primary = match key {
        SortKey::Name => Ordering::Equal,
        SortKey::Quantity => a.quantity.cmp(&b.quantity),
        SortKey::Category => a
            .category
            .display_name()
            .to_lowercase()
            .cmp(&b.category.display_name().to_lowercase()),
        SortKey::Expiry => missing_last(a.expiry_date.as_ref(), b.expiry_date.as_ref()),
        SortKey::Supplier => missing_last(
            a.supplier.as_ref().map(|s| s.to_lowercase()).as_ref(),
            b.supplier.as_ref().map(|s| s.to_lowercase()).as_ref(),
        ),
    };
    primary
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Значения без поля идут после заполненных
fn missing_last<T: Ord>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contracts::domain::a001_inventory_item::{InventoryItem, LowStockThresholds};
    use contracts::enums::{InventoryCategory, StockStatus};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn tagged(id: &str, category: InventoryCategory, name: &str, quantity: u32) -> TaggedItem {
        let mut item = InventoryItem::new_for_insert(category, name, quantity);
        item.id = id.to_string();
        TaggedItem::tag(item, today(), &LowStockThresholds::default())
    }

    fn sample() -> Vec<TaggedItem> {
        let mut paper = tagged("o1", InventoryCategory::OfficeSupplies, "Printer Paper", 40);
        paper.item.supplier = Some("staples".into());
        let mut rice = tagged("f1", InventoryCategory::Food, "Rice", 4);
        rice.item.expiry_date = NaiveDate::from_ymd_opt(2027, 1, 10);
        rice.item.supplier = Some("Metro".into());
        let mut milk = tagged("f2", InventoryCategory::Food, "milk", 30);
        milk.item.expiry_date = NaiveDate::from_ymd_opt(2026, 11, 1);
        vec![
            tagged("l1", InventoryCategory::It, "HDMI Cable", 0),
            paper,
            rice,
            milk,
            tagged("u1", InventoryCategory::Furniture, "Desk", 12),
        ]
    }

    fn ids(items: &[TaggedItem]) -> Vec<&str> {
        items.iter().map(|t| t.item.id.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let items = vec![
            tagged("a", InventoryCategory::OfficeSupplies, "Printer Paper", 40),
            tagged("b", InventoryCategory::It, "HDMI Cable", 8),
        ];
        let query = ListViewQuery::default().with_search("paper");
        let names: Vec<_> = apply_view(&items, &query)
            .into_iter()
            .map(|t| t.item.name)
            .collect();
        assert_eq!(names, vec!["Printer Paper"]);
    }

    #[test]
    fn test_filters_or_within_and_across_sets() {
        let query = ListViewQuery::default()
            .with_categories([InventoryCategory::Food, InventoryCategory::It])
            .with_statuses([StockStatus::LowStock, StockStatus::OutOfStock]);
        assert_eq!(ids(&apply_view(&sample(), &query)), vec!["l1", "f1"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let query = ListViewQuery::default()
            .with_categories([InventoryCategory::Food])
            .with_search("i");
        let once = apply_view(&sample(), &query);
        let twice = apply_view(&once, &query);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sorting_twice_is_a_no_op() {
        for key in [
            SortKey::Name,
            SortKey::Quantity,
            SortKey::Category,
            SortKey::Expiry,
            SortKey::Supplier,
        ] {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                let query = ListViewQuery::default().sorted_by(key, direction);
                let once = apply_view(&sample(), &query);
                let twice = apply_view(&once, &query);
                assert_eq!(ids(&once), ids(&twice), "{:?} {:?}", key, direction);
            }
        }
    }

    #[test]
    fn test_missing_expiry_sorts_last_ascending() {
        let query = ListViewQuery::default().sorted_by(SortKey::Expiry, SortDirection::Asc);
        let sorted = apply_view(&sample(), &query);
        assert_eq!(&ids(&sorted)[..2], &["f2", "f1"]);

        let query = ListViewQuery::default().sorted_by(SortKey::Expiry, SortDirection::Desc);
        let sorted = apply_view(&sample(), &query);
        assert_eq!(&ids(&sorted)[3..], &["f1", "f2"]);
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let query = ListViewQuery::default().sorted_by(SortKey::Name, SortDirection::Asc);
        let names: Vec<_> = apply_view(&sample(), &query)
            .into_iter()
            .map(|t| t.item.name)
            .collect();
        assert_eq!(names, vec!["Desk", "HDMI Cable", "milk", "Printer Paper", "Rice"]);
    }

    #[test]
    fn test_cleared_query_keeps_default_order() {
        let mut query = ListViewQuery::default()
            .with_search("rice")
            .sorted_by(SortKey::Quantity, SortDirection::Desc);
        query.clear();
        assert_eq!(ids(&apply_view(&sample(), &query)), ids(&sample()));
    }

    #[test]
    fn test_campus_restriction() {
        let mut items = sample();
        items[0].item.campus_ref = Some("north".into());
        let query = ListViewQuery {
            campus_ref: Some("north".into()),
            ..ListViewQuery::default()
        };
        assert_eq!(ids(&apply_view(&items, &query)), vec!["l1"]);
    }
}
