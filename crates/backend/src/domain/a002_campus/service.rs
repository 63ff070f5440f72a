use super::repository;
use contracts::domain::a002_campus::{Campus, CampusDto};
use contracts::system::auth::UserContext;

use crate::shared::data::DocumentStore;
use crate::shared::error::AppError;

/// Список кампусов, по имени
pub async fn list_all(store: &dyn DocumentStore) -> Result<Vec<Campus>, AppError> {
    let mut campuses = repository::list(store).await?;
    campuses.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(campuses)
}

pub async fn get_by_id(store: &dyn DocumentStore, id: &str) -> Result<Campus, AppError> {
    repository::get(store, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Campus {} not found", id)))
}

/// Создание кампуса. Код уникален (без учета регистра).
pub async fn create(
    store: &dyn DocumentStore,
    ctx: &UserContext,
    dto: &CampusDto,
) -> Result<Campus, AppError> {
    AppError::require(ctx.role.is_admin(), "create campuses")?;
    let mut campus = Campus::from_dto(dto).map_err(AppError::Validation)?;

    let existing = repository::list(store).await?;
    if existing.iter().any(|c| c.code.eq_ignore_ascii_case(&campus.code)) {
        return Err(AppError::Conflict(format!(
            "Campus with code '{}' already exists",
            campus.code
        )));
    }

    campus.id = repository::insert(store, &campus).await?;
    tracing::info!("Campus {} '{}' created ({})", campus.code, campus.name, campus.id);
    Ok(campus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::MemoryDocumentStore;
    use contracts::system::auth::UserRole;

    fn dto(code: &str, name: &str) -> CampusDto {
        CampusDto {
            code: code.into(),
            name: name.into(),
            address: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_sorted() {
        let store = MemoryDocumentStore::new();
        let admin = UserContext::new("a-1", UserRole::Admin);
        create(&store, &admin, &dto("north", "North Campus")).await.unwrap();
        let east = create(&store, &admin, &dto("east", "East Campus")).await.unwrap();
        assert_eq!(east.code, "EAST");

        let names: Vec<_> = list_all(&store).await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["East Campus", "North Campus"]);
        assert_eq!(get_by_id(&store, &east.id).await.unwrap().code, "EAST");
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let store = MemoryDocumentStore::new();
        let admin = UserContext::new("a-1", UserRole::Admin);
        create(&store, &admin, &dto("N1", "North")).await.unwrap();
        let err = create(&store, &admin, &dto("n1", "North again")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_manager_cannot_create() {
        let store = MemoryDocumentStore::new();
        let manager = UserContext::new("m-1", UserRole::Manager);
        let err = create(&store, &manager, &dto("N1", "North")).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
