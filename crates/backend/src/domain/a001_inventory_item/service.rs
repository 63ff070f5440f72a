use super::repository;
use chrono::NaiveDate;
use contracts::domain::a001_inventory_item::{
    InventoryItem, InventoryItemDto, ItemCondition, TaggedItem,
};
use contracts::domain::a006_notification::NotificationKind;
use contracts::enums::{InventoryCategory, StockStatus};
use contracts::shared::api::MutationResponse;
use contracts::shared::list_view::ListViewQuery;
use contracts::system::auth::{UserContext, UserRole};

use crate::domain::a006_notification;
use crate::shared::app_state::AppState;
use crate::shared::error::AppError;
use crate::shared::list_view::apply_view;

/// Роли, которые получают складские оповещения
pub const ALERT_ROLES: [UserRole; 2] = [UserRole::Admin, UserRole::Manager];

/// Список с фильтрами и сортировкой. Ждет loading gate.
pub async fn list_view(
    state: &AppState,
    query: &ListViewQuery,
    today: NaiveDate,
) -> Result<Vec<TaggedItem>, AppError> {
    let items = state.tagged_items(today).await?;
    Ok(apply_view(&items, query))
}

pub async fn get(
    state: &AppState,
    category: InventoryCategory,
    id: &str,
    today: NaiveDate,
) -> Result<TaggedItem, AppError> {
    let item = load(state, category, id).await?;
    Ok(TaggedItem::tag(item, today, &state.thresholds))
}

async fn load(
    state: &AppState,
    category: InventoryCategory,
    id: &str,
) -> Result<InventoryItem, AppError> {
    repository::get(state.store.as_ref(), category, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} item {} not found", category, id)))
}

/// Создание новой записи
pub async fn create(
    state: &AppState,
    ctx: &UserContext,
    dto: &InventoryItemDto,
    today: NaiveDate,
) -> Result<MutationResponse<TaggedItem>, AppError> {
    AppError::require(ctx.role.can_manage_inventory(), "create inventory items")?;
    let mut item = InventoryItem::from_dto(dto).map_err(AppError::Validation)?;
    item.touch();

    item.id = repository::insert(state.store.as_ref(), &item).await?;
    tracing::info!("{} item '{}' created by {} ({})", item.category, item.name, ctx.uid, item.id);

    let tagged = TaggedItem::tag(item, today, &state.thresholds);
    let warnings = alert_on_transition(state, None, &tagged).await;
    Ok(MutationResponse::with_warnings(tagged, warnings))
}

/// Обновление записи из формы
pub async fn update(
    state: &AppState,
    ctx: &UserContext,
    category: InventoryCategory,
    id: &str,
    dto: &InventoryItemDto,
    today: NaiveDate,
) -> Result<MutationResponse<TaggedItem>, AppError> {
    AppError::require(ctx.role.can_manage_inventory(), "edit inventory items")?;
    let mut item = load(state, category, id).await?;
    let before = state.thresholds.status_of(&item, today).status;

    item.update(dto).map_err(AppError::Validation)?;
    item.touch();
    repository::update(state.store.as_ref(), &item).await?;

    let tagged = TaggedItem::tag(item, today, &state.thresholds);
    let warnings = alert_on_transition(state, Some(before), &tagged).await;
    Ok(MutationResponse::with_warnings(tagged, warnings))
}

/// Отметка Good/Damaged (только IT и Furniture)
pub async fn set_condition(
    state: &AppState,
    ctx: &UserContext,
    category: InventoryCategory,
    id: &str,
    condition: ItemCondition,
    today: NaiveDate,
) -> Result<TaggedItem, AppError> {
    AppError::require(ctx.role.can_manage_inventory(), "change item condition")?;
    let mut item = load(state, category, id).await?;
    item.set_condition(condition).map_err(AppError::Validation)?;
    item.touch();
    repository::update(state.store.as_ref(), &item).await?;
    tracing::info!("{} item {} marked {}", category, id, condition.code());
    Ok(TaggedItem::tag(item, today, &state.thresholds))
}

/// Списание. Остаток не уходит ниже нуля. Если остаток изменился между
/// чтением и записью, commit отклоняется и ответ будет Conflict.
pub async fn deduct(
    state: &AppState,
    ctx: &UserContext,
    category: InventoryCategory,
    id: &str,
    units: u32,
    today: NaiveDate,
) -> Result<MutationResponse<TaggedItem>, AppError> {
    AppError::require(ctx.role.can_manage_inventory(), "deduct stock")?;
    let repository::StockRead { mut item, guard } =
        repository::get_for_update(state.store.as_ref(), category, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} item {} not found", category, id)))?;
    let before = state.thresholds.status_of(&item, today).status;

    let deducted = item.deduct(units);
    item.touch();
    state
        .store
        .commit(vec![guard, repository::quantity_update_op(&item)])
        .await?;
    tracing::info!(
        "Deducted {} of {} requested from {} '{}', {} left",
        deducted,
        units,
        category,
        item.name,
        item.quantity
    );

    let tagged = TaggedItem::tag(item, today, &state.thresholds);
    let mut warnings = alert_on_transition(state, Some(before), &tagged).await;
    if deducted < units {
        warnings.push(format!(
            "Only {} of {} units were available",
            deducted, units
        ));
    }
    Ok(MutationResponse::with_warnings(tagged, warnings))
}

pub async fn delete(
    state: &AppState,
    ctx: &UserContext,
    category: InventoryCategory,
    id: &str,
) -> Result<(), AppError> {
    AppError::require(ctx.role.can_manage_inventory(), "delete inventory items")?;
    repository::delete(state.store.as_ref(), category, id).await?;
    tracing::info!("{} item {} deleted by {}", category, id, ctx.uid);
    Ok(())
}

/// Текст оповещения для статуса, который требует реакции склада
pub fn stock_alert(tagged: &TaggedItem) -> Option<(NotificationKind, String, String)> {
    let item = &tagged.item;
    match tagged.status {
        StockStatus::LowStock => Some((
            NotificationKind::LowStock,
            format!("Low stock: {}", item.name),
            format!("{} '{}' is down to {} units.", item.category, item.name, item.quantity),
        )),
        StockStatus::OutOfStock => Some((
            NotificationKind::OutOfStock,
            format!("Out of stock: {}", item.name),
            format!("{} '{}' is out of stock.", item.category, item.name),
        )),
        StockStatus::Expired => Some((
            NotificationKind::Expiry,
            format!("Expired: {}", item.name),
            match item.expiry_date {
                Some(date) => format!("{} '{}' expired on {}.", item.category, item.name, date),
                None => format!("{} '{}' has expired.", item.category, item.name),
            },
        )),
        StockStatus::InStock | StockStatus::Damaged => None,
    }
}

/// Оповестить Admin и Manager, если запись только что перешла в Low/Out of Stock.
/// В журнал оповещений запись попадает только после успешной отправки.
/// Возвращает предупреждения для `MutationResponse`.
pub async fn alert_on_transition(
    state: &AppState,
    before: Option<StockStatus>,
    tagged: &TaggedItem,
) -> Vec<String> {
    let mut warnings = Vec::new();
    let entered = matches!(tagged.status, StockStatus::LowStock | StockStatus::OutOfStock)
        && before != Some(tagged.status);
    if !entered {
        return warnings;
    }
    let Some((kind, title, message)) = stock_alert(tagged) else {
        return warnings;
    };
    match a006_notification::service::notify_roles(
        state.store.as_ref(),
        &ALERT_ROLES,
        kind,
        &title,
        &message,
    )
    .await
    {
        // Неотмеченную запись подхватит фоновый воркер
        Ok(_) => state.alerts.record(tagged),
        Err(e) => {
            tracing::warn!("Stock alert for '{}' was not sent: {}", tagged.item.name, e);
            warnings.push(format!("Stock alert was not sent: {}", e));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::app_state::test_support::{memory_state, yielding_state};
    use crate::shared::data::collections::{MEDICATIONS, NOTIFICATIONS, OFFICE_SUPPLIES};
    use crate::shared::data::DocumentStore;
    use contracts::shared::list_view::{SortDirection, SortKey};
    use serde_json::json;
    use std::time::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn manager() -> UserContext {
        UserContext::new("mgr-1", UserRole::Manager)
    }

    fn dto(category: InventoryCategory, name: &str, quantity: i64) -> InventoryItemDto {
        InventoryItemDto {
            id: None,
            name: name.into(),
            category,
            quantity,
            expiry_date: None,
            condition: None,
            assigned_to: None,
            supplier: None,
            campus_ref: None,
        }
    }

    async fn create_item(
        state: &AppState,
        category: InventoryCategory,
        name: &str,
        quantity: i64,
    ) -> MutationResponse<TaggedItem> {
        create(state, &manager(), &dto(category, name, quantity), today())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_staff_cannot_create() {
        let (state, _) = memory_state();
        let staff = UserContext::new("s-1", UserRole::Staff);
        let rice = dto(InventoryCategory::Food, "Rice", 3);
        let err = create(&state, &staff, &rice, today()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_writes_collection_fields_and_alerts_on_low_stock() {
        let (state, store) = memory_state();
        let created =
            create_item(&state, InventoryCategory::OfficeSupplies, "Printer Paper", 4).await;
        assert_eq!(created.data.status, StockStatus::LowStock);
        assert!(created.warnings.is_empty());

        let docs = store.list(OFFICE_SUPPLIES).await.unwrap();
        assert_eq!(docs[0].data["itemName"], json!("Printer Paper"));
        assert_eq!(docs[0].data["count"], json!(4));
        assert_eq!(store.list(NOTIFICATIONS).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_deduct_clamps_and_reports_shortfall() {
        let (state, _) = memory_state();
        let created = create_item(&state, InventoryCategory::Health, "Paracetamol", 3).await;
        let id = created.data.item.id.clone();

        let result = deduct(&state, &manager(), InventoryCategory::Health, &id, 5, today())
            .await
            .unwrap();
        assert_eq!(result.data.item.quantity, 0);
        assert_eq!(result.data.status, StockStatus::OutOfStock);
        assert!(result.warnings.iter().any(|w| w.contains("Only 3 of 5")));
    }

    #[tokio::test]
    async fn test_concurrent_deducts_do_not_lose_updates() {
        let (state, store) = yielding_state();
        let id = store
            .insert(MEDICATIONS, json!({"medicineName": "Gauze", "stock": 10}))
            .await
            .unwrap();
        let health = InventoryCategory::Health;

        let (manager_a, manager_b) = (manager(), manager());
        let (first, second) = tokio::join!(
            deduct(&state, &manager_a, health, &id, 3, today()),
            deduct(&state, &manager_b, health, &id, 2, today()),
        );
        assert!(first.is_ok() != second.is_ok());

        let (winner, loser) = match (first, second) {
            (Ok(ok), Err(err)) | (Err(err), Ok(ok)) => (ok, err),
            _ => unreachable!(),
        };
        assert!(matches!(loser, AppError::Conflict(_)));
        let stored = store.get(MEDICATIONS, &id).await.unwrap().unwrap();
        assert_eq!(stored.data["stock"], json!(winner.data.item.quantity));
    }

    #[tokio::test]
    async fn test_condition_rejected_for_untracked_category() {
        let (state, _) = memory_state();
        let created = create_item(&state, InventoryCategory::Food, "Rice", 30).await;
        let err = set_condition(
            &state,
            &manager(),
            InventoryCategory::Food,
            &created.data.item.id,
            ItemCondition::Damaged,
            today(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_damaged_laptop_reports_damaged() {
        let (state, _) = memory_state();
        let created = create_item(&state, InventoryCategory::It, "ThinkPad", 8).await;
        let tagged = set_condition(
            &state,
            &manager(),
            InventoryCategory::It,
            &created.data.item.id,
            ItemCondition::Damaged,
            today(),
        )
        .await
        .unwrap();
        assert_eq!(tagged.status, StockStatus::Damaged);
    }

    #[tokio::test]
    async fn test_list_view_reads_merged_feed() {
        let (state, _) = memory_state();
        create_item(&state, InventoryCategory::Food, "Rice", 30).await;
        create_item(&state, InventoryCategory::It, "HDMI Cable", 12).await;

        let mut rx = state.feed.watch();
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| s.items.len() == 2))
            .await
            .unwrap()
            .unwrap();

        let query = ListViewQuery::default().sorted_by(SortKey::Quantity, SortDirection::Desc);
        let names: Vec<_> = list_view(&state, &query, today())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.item.name)
            .collect();
        assert_eq!(names, vec!["Rice", "HDMI Cable"]);
    }

    #[tokio::test]
    async fn test_update_missing_item_is_not_found() {
        let (state, _) = memory_state();
        let rice = dto(InventoryCategory::Food, "Rice", 3);
        let err = update(&state, &manager(), InventoryCategory::Food, "nope", &rice, today())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
