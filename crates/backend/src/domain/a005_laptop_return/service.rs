use super::repository;
use chrono::Utc;
use contracts::domain::a005_laptop_return::{LaptopReturn, LaptopReturnDto};
use contracts::domain::a006_notification::{Notification, NotificationKind, Recipient};
use contracts::shared::api::MutationResponse;
use contracts::system::auth::UserContext;

use crate::domain::{a004_laptop_submission, a006_notification};
use crate::shared::data::DocumentStore;
use crate::shared::error::AppError;

/// Оформить возврат: удаление сдачи и создание возврата одним commit
pub async fn process_return(
    store: &dyn DocumentStore,
    ctx: &UserContext,
    submission_id: &str,
    dto: &LaptopReturnDto,
) -> Result<MutationResponse<LaptopReturn>, AppError> {
    AppError::require(ctx.role.can_manage_inventory(), "process laptop returns")?;
    let submission = a004_laptop_submission::repository::get(store, submission_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Laptop submission {} not found", submission_id))
        })?;

    let mut record = LaptopReturn::from_submission(&submission, ctx, dto, Utc::now());
    let ids = store
        .commit(vec![
            a004_laptop_submission::repository::delete_op(&submission.id),
            repository::insert_op(&record)?,
        ])
        .await
        .map_err(|e| {
            tracing::error!("Laptop return for submission {} failed: {}", submission_id, e);
            e
        })?;
    record.id = ids.get(1).cloned().unwrap_or_default();
    tracing::info!(
        "Laptop {} returned to {} by {}",
        record.serial_number,
        record.returned_to,
        ctx.uid
    );

    let mut warnings = Vec::new();
    let n = Notification::new(
        Recipient::User(record.returned_to.clone()),
        NotificationKind::RequestUpdate,
        "Laptop returned",
        format!("Your laptop {} ({}) is ready for pickup.", record.model, record.serial_number),
        Utc::now(),
    );
    a006_notification::service::notify_best_effort(store, n, &mut warnings).await;
    Ok(MutationResponse::with_warnings(record, warnings))
}

/// Журнал возвратов, новые сверху
pub async fn list_all(store: &dyn DocumentStore) -> Result<Vec<LaptopReturn>, AppError> {
    let mut records = repository::list(store).await?;
    records.sort_by(|a, b| b.returned_at.cmp(&a.returned_at));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a004_laptop_submission::service::submit;
    use crate::shared::data::collections::LAPTOP_SUBMISSIONS;
    use crate::shared::data::MemoryDocumentStore;
    use contracts::domain::a004_laptop_submission::LaptopSubmissionDto;
    use contracts::system::auth::UserRole;

    fn submission_dto() -> LaptopSubmissionDto {
        LaptopSubmissionDto {
            laptop_ref: None,
            serial_number: "SN-100".into(),
            model: "Latitude 5440".into(),
            campus_ref: Some("north".into()),
            notes: Some("Broken hinge".into()),
        }
    }

    #[tokio::test]
    async fn test_return_replaces_submission() {
        let store = MemoryDocumentStore::new();
        let staff = UserContext::new("s-1", UserRole::Staff);
        let manager = UserContext::new("m-1", UserRole::Manager);
        let submission = submit(&store, &staff, &submission_dto()).await.unwrap();

        let result = process_return(&store, &manager, &submission.id, &LaptopReturnDto::default())
            .await
            .unwrap();
        let record = result.data;
        assert!(!record.id.is_empty());
        assert_eq!(record.returned_to, "s-1");
        assert_eq!(record.processed_by, "m-1");
        assert_eq!(record.notes.as_deref(), Some("Broken hinge"));

        assert!(store.list(LAPTOP_SUBMISSIONS).await.unwrap().is_empty());
        assert_eq!(list_all(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_submission_leaves_returns_empty() {
        let store = MemoryDocumentStore::new();
        let manager = UserContext::new("m-1", UserRole::Manager);
        let err = process_return(&store, &manager, "nope", &LaptopReturnDto::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(list_all(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_staff_cannot_process_returns() {
        let store = MemoryDocumentStore::new();
        let staff = UserContext::new("s-1", UserRole::Staff);
        let submission = submit(&store, &staff, &submission_dto()).await.unwrap();
        let err = process_return(&store, &staff, &submission.id, &LaptopReturnDto::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
