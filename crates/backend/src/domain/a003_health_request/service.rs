use super::repository;
use chrono::Utc;
use contracts::domain::a001_inventory_item::TaggedItem;
use contracts::domain::a003_health_request::{HealthRequest, HealthRequestDto, RequestDecisionDto};
use contracts::domain::a006_notification::{Notification, NotificationKind, Recipient};
use contracts::enums::InventoryCategory;
use contracts::shared::api::MutationResponse;
use contracts::system::auth::UserContext;

use crate::domain::a001_inventory_item::repository::StockRead;
use crate::domain::{a001_inventory_item, a006_notification};
use crate::shared::app_state::AppState;
use crate::shared::data::DocumentStore;
use crate::shared::error::AppError;

/// Подать заявку (любая роль)
pub async fn submit(
    store: &dyn DocumentStore,
    ctx: &UserContext,
    dto: &HealthRequestDto,
) -> Result<HealthRequest, AppError> {
    let mut request =
        HealthRequest::new_for_insert(ctx, dto, Utc::now()).map_err(AppError::Validation)?;
    request.id = repository::insert(store, &request).await?;
    tracing::info!(
        "Health request {} submitted by {}: {} x {}",
        request.id,
        ctx.label(),
        request.quantity,
        request.item_name
    );
    Ok(request)
}

/// Staff видит свои заявки, Manager и Admin все. Новые сверху.
pub async fn list_for(
    store: &dyn DocumentStore,
    ctx: &UserContext,
) -> Result<Vec<HealthRequest>, AppError> {
    let mut requests: Vec<_> = repository::list(store)
        .await?
        .into_iter()
        .filter(|r| ctx.role.can_decide_requests() || r.requester_id == ctx.uid)
        .collect();
    requests.sort_by(|a, b| b.date_requested.cmp(&a.date_requested));
    Ok(requests)
}

async fn load_pending(store: &dyn DocumentStore, id: &str) -> Result<HealthRequest, AppError> {
    let request = repository::get(store, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Health request {} not found", id)))?;
    if !request.is_pending() {
        return Err(AppError::Conflict(format!(
            "Health request {} is already {}",
            id, request.status
        )));
    }
    Ok(request)
}

/// Позиция склада Health для заявки: по ссылке, иначе по имени без учета регистра
async fn find_stock_item(
    store: &dyn DocumentStore,
    request: &HealthRequest,
) -> Result<StockRead, AppError> {
    let category = InventoryCategory::Health;
    if let Some(item_ref) = &request.item_ref {
        return a001_inventory_item::repository::get_for_update(store, category, item_ref)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Health item {} not found", item_ref)));
    }
    let wanted = request.item_name.to_lowercase();
    a001_inventory_item::repository::list_for_update(store, category)
        .await?
        .into_iter()
        .find(|read| read.item.name.to_lowercase() == wanted)
        .ok_or_else(|| {
            AppError::NotFound(format!("No Health item named '{}'", request.item_name))
        })
}

/// Одобрение: решение и списание остатка пишутся одним commit.
/// Commit проверяет, что заявка все еще pending и остаток не менялся,
/// поэтому параллельное решение по той же заявке получает Conflict.
/// Уведомления после commit не влияют на результат.
pub async fn approve(
    state: &AppState,
    ctx: &UserContext,
    id: &str,
    dto: &RequestDecisionDto,
) -> Result<MutationResponse<HealthRequest>, AppError> {
    AppError::require(ctx.role.can_decide_requests(), "approve health requests")?;
    let store = state.store.as_ref();
    let mut request = load_pending(store, id).await?;
    let StockRead { mut item, guard } = find_stock_item(store, &request).await?;

    let today = state.today();
    let before = state.thresholds.status_of(&item, today).status;
    let now = Utc::now();

    request
        .approve(ctx, dto.note.clone(), now)
        .map_err(AppError::Conflict)?;
    let deducted = item.deduct(request.quantity);
    item.touch();

    store
        .commit(vec![
            repository::pending_guard(id),
            guard,
            repository::decision_op(&request)?,
            a001_inventory_item::repository::quantity_update_op(&item),
        ])
        .await
        .map_err(|e| {
            tracing::error!("Approval of health request {} failed: {}", id, e);
            e
        })?;
    tracing::info!(
        "Health request {} approved by {}, {} of {} '{}' deducted",
        id,
        ctx.uid,
        deducted,
        request.quantity,
        item.name
    );

    let mut warnings = Vec::new();
    if deducted < request.quantity {
        warnings.push(format!(
            "Only {} of {} units were in stock",
            deducted, request.quantity
        ));
    }
    notify_requester(store, &request, &mut warnings).await;

    let tagged = TaggedItem::tag(item, today, &state.thresholds);
    let alert_warnings =
        a001_inventory_item::service::alert_on_transition(state, Some(before), &tagged).await;
    warnings.extend(alert_warnings);

    Ok(MutationResponse::with_warnings(request, warnings))
}

pub async fn reject(
    store: &dyn DocumentStore,
    ctx: &UserContext,
    id: &str,
    dto: &RequestDecisionDto,
) -> Result<MutationResponse<HealthRequest>, AppError> {
    AppError::require(ctx.role.can_decide_requests(), "reject health requests")?;
    let mut request = load_pending(store, id).await?;
    request
        .reject(ctx, dto.note.clone(), Utc::now())
        .map_err(AppError::Conflict)?;
    store
        .commit(vec![repository::pending_guard(id), repository::decision_op(&request)?])
        .await?;
    tracing::info!("Health request {} rejected by {}", id, ctx.uid);

    let mut warnings = Vec::new();
    notify_requester(store, &request, &mut warnings).await;
    Ok(MutationResponse::with_warnings(request, warnings))
}

async fn notify_requester(
    store: &dyn DocumentStore,
    request: &HealthRequest,
    warnings: &mut Vec<String>,
) {
    let title = format!("Request {}", request.status);
    let mut message = format!(
        "Your request for {} x {} was {}.",
        request.quantity, request.item_name, request.status
    );
    if let Some(note) = &request.decision_note {
        message.push_str(&format!(" Note: {}", note));
    }
    let n = Notification::new(
        Recipient::User(request.requester_id.clone()),
        NotificationKind::RequestUpdate,
        title,
        message,
        Utc::now(),
    );
    a006_notification::service::notify_best_effort(store, n, warnings).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::app_state::test_support::{memory_state, yielding_state};
    use crate::shared::data::collections::{MEDICATIONS, USER_NOTIFICATIONS};
    use contracts::domain::a003_health_request::RequestStatus;
    use contracts::system::auth::UserRole;
    use serde_json::json;

    fn staff() -> UserContext {
        UserContext::new("staff-1", UserRole::Staff).with_email("staff@campus.local")
    }

    fn manager() -> UserContext {
        UserContext::new("mgr-1", UserRole::Manager)
    }

    fn dto(item_name: &str, quantity: i64) -> HealthRequestDto {
        HealthRequestDto {
            item_ref: None,
            item_name: item_name.into(),
            quantity,
            reason: "First aid kit refill".into(),
        }
    }

    #[tokio::test]
    async fn test_approve_deducts_stock_and_notifies_requester() {
        let (state, store) = memory_state();
        let med_id = store
            .insert(MEDICATIONS, json!({"medicineName": "Paracetamol", "stock": 50}))
            .await
            .unwrap();
        let request = submit(store.as_ref(), &staff(), &dto("paracetamol", 4)).await.unwrap();

        let result = approve(&state, &manager(), &request.id, &RequestDecisionDto::default())
            .await
            .unwrap();
        assert_eq!(result.data.status, RequestStatus::Approved);
        assert_eq!(result.data.decided_by.as_deref(), Some("mgr-1"));
        assert!(result.warnings.is_empty());

        let med = store.get(MEDICATIONS, &med_id).await.unwrap().unwrap();
        assert_eq!(med.data["stock"], json!(46));
        assert_eq!(store.list(USER_NOTIFICATIONS).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_approvals_deduct_once() {
        let (state, store) = yielding_state();
        let med_id = store
            .insert(MEDICATIONS, json!({"medicineName": "Paracetamol", "stock": 50}))
            .await
            .unwrap();
        let request = submit(store.as_ref(), &staff(), &dto("Paracetamol", 4)).await.unwrap();
        let other = UserContext::new("mgr-2", UserRole::Manager);
        let decision = RequestDecisionDto::default();

        let first_manager = manager();
        let (first, second) = tokio::join!(
            approve(&state, &first_manager, &request.id, &decision),
            approve(&state, &other, &request.id, &decision),
        );
        assert!(first.is_ok() != second.is_ok());
        assert!(matches!(first.err().or(second.err()), Some(AppError::Conflict(_))));

        let med = store.get(MEDICATIONS, &med_id).await.unwrap().unwrap();
        assert_eq!(med.data["stock"], json!(46));
    }

    #[tokio::test]
    async fn test_concurrent_approve_and_reject_decide_once() {
        let (state, store) = yielding_state();
        store
            .insert(MEDICATIONS, json!({"medicineName": "Gauze", "stock": 10}))
            .await
            .unwrap();
        let request = submit(store.as_ref(), &staff(), &dto("Gauze", 2)).await.unwrap();
        let decision = RequestDecisionDto::default();

        let (manager_a, manager_b) = (manager(), manager());
        let (approved, rejected) = tokio::join!(
            approve(&state, &manager_a, &request.id, &decision),
            reject(state.store.as_ref(), &manager_b, &request.id, &decision),
        );
        assert!(approved.is_ok() != rejected.is_ok());

        let stored = repository::get(store.as_ref(), &request.id).await.unwrap().unwrap();
        let stock = store.list(MEDICATIONS).await.unwrap()[0].data["stock"].clone();
        match stored.status {
            RequestStatus::Approved => assert_eq!(stock, json!(8)),
            RequestStatus::Rejected => assert_eq!(stock, json!(10)),
            RequestStatus::Pending => panic!("request left pending"),
        }
    }

    #[tokio::test]
    async fn test_second_decision_conflicts() {
        let (state, store) = memory_state();
        store
            .insert(MEDICATIONS, json!({"medicineName": "Ibuprofen", "stock": 20}))
            .await
            .unwrap();
        let request = submit(store.as_ref(), &staff(), &dto("Ibuprofen", 1)).await.unwrap();
        let note = RequestDecisionDto {
            note: Some("Out of budget".into()),
        };
        reject(store.as_ref(), &manager(), &request.id, &note).await.unwrap();

        let err = approve(&state, &manager(), &request.id, &RequestDecisionDto::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_approve_unknown_item_writes_nothing() {
        let (state, store) = memory_state();
        let request = submit(store.as_ref(), &staff(), &dto("Aspirin", 2)).await.unwrap();
        let err = approve(&state, &manager(), &request.id, &RequestDecisionDto::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let stored = repository::get(store.as_ref(), &request.id).await.unwrap().unwrap();
        assert!(stored.is_pending());
    }

    #[tokio::test]
    async fn test_staff_sees_only_own_requests() {
        let (_, store) = memory_state();
        submit(store.as_ref(), &staff(), &dto("Bandages", 3)).await.unwrap();
        submit(store.as_ref(), &UserContext::new("staff-2", UserRole::Staff), &dto("Gauze", 1))
            .await
            .unwrap();

        assert_eq!(list_for(store.as_ref(), &staff()).await.unwrap().len(), 1);
        assert_eq!(list_for(store.as_ref(), &manager()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_staff_cannot_decide() {
        let (_, store) = memory_state();
        let request = submit(store.as_ref(), &staff(), &dto("Bandages", 3)).await.unwrap();
        let err = reject(store.as_ref(), &staff(), &request.id, &RequestDecisionDto::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
