use super::repository;
use chrono::Utc;
use contracts::domain::a004_laptop_submission::{LaptopSubmission, LaptopSubmissionDto};
use contracts::enums::InventoryCategory;
use contracts::system::auth::UserContext;

use crate::domain::a001_inventory_item;
use crate::shared::data::DocumentStore;
use crate::shared::error::AppError;

/// Сдать ноутбук. Ссылка на учтенный ноутбук должна существовать.
pub async fn submit(
    store: &dyn DocumentStore,
    ctx: &UserContext,
    dto: &LaptopSubmissionDto,
) -> Result<LaptopSubmission, AppError> {
    let mut submission =
        LaptopSubmission::new_for_insert(ctx, dto, Utc::now()).map_err(AppError::Validation)?;

    if let Some(laptop_ref) = &submission.laptop_ref {
        let known =
            a001_inventory_item::repository::get(store, InventoryCategory::It, laptop_ref).await?;
        if known.is_none() {
            return Err(AppError::NotFound(format!("Laptop {} not found", laptop_ref)));
        }
    }

    submission.id = repository::insert(store, &submission).await?;
    tracing::info!(
        "Laptop {} ({}) submitted by {}",
        submission.serial_number,
        submission.model,
        ctx.label()
    );
    Ok(submission)
}

/// Staff видит свои сдачи, Manager и Admin все
pub async fn list_for(
    store: &dyn DocumentStore,
    ctx: &UserContext,
) -> Result<Vec<LaptopSubmission>, AppError> {
    let mut submissions: Vec<_> = repository::list(store)
        .await?
        .into_iter()
        .filter(|s| ctx.role.can_manage_inventory() || s.submitted_by == ctx.uid)
        .collect();
    submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    Ok(submissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::collections::LAPTOPS;
    use crate::shared::data::MemoryDocumentStore;
    use contracts::system::auth::UserRole;
    use serde_json::json;

    fn dto(laptop_ref: Option<&str>) -> LaptopSubmissionDto {
        LaptopSubmissionDto {
            laptop_ref: laptop_ref.map(str::to_string),
            serial_number: "pf-2k9x".into(),
            model: "ThinkPad T14".into(),
            campus_ref: None,
            notes: Some("  ".into()),
        }
    }

    #[tokio::test]
    async fn test_submit_normalizes_and_lists() {
        let store = MemoryDocumentStore::new();
        let staff = UserContext::new("s-1", UserRole::Staff);
        let submission = submit(&store, &staff, &dto(None)).await.unwrap();
        assert_eq!(submission.serial_number, "PF-2K9X");
        assert_eq!(submission.notes, None);

        assert_eq!(list_for(&store, &staff).await.unwrap().len(), 1);
        let other = UserContext::new("s-2", UserRole::Staff);
        assert!(list_for(&store, &other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_laptop_ref_is_rejected() {
        let store = MemoryDocumentStore::new();
        let staff = UserContext::new("s-1", UserRole::Staff);
        let err = submit(&store, &staff, &dto(Some("missing"))).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let laptop_id = store
            .insert(LAPTOPS, json!({"model": "ThinkPad T14", "qty": 1}))
            .await
            .unwrap();
        let submission = submit(&store, &staff, &dto(Some(&laptop_id))).await.unwrap();
        assert_eq!(submission.laptop_ref, Some(laptop_id));
    }
}
