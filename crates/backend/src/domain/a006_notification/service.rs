use super::repository;
use chrono::Utc;
use contracts::domain::a006_notification::{
    Notification, NotificationKind, NotificationListItem, Recipient,
};
use contracts::system::auth::{UserContext, UserRole};

use crate::shared::data::collections::{NOTIFICATIONS, USER_NOTIFICATIONS};
use crate::shared::data::DocumentStore;
use crate::shared::error::AppError;

/// Создать уведомление
pub async fn notify(
    store: &dyn DocumentStore,
    notification: Notification,
) -> Result<String, AppError> {
    notification.validate().map_err(AppError::Validation)?;
    let id = repository::insert(store, &notification).await?;
    tracing::debug!(
        "Notification {} ({}) -> {:?}",
        id,
        notification.kind.code(),
        notification.recipient
    );
    Ok(id)
}

/// Одно уведомление на каждую роль, одним commit: либо все, либо ни одного
pub async fn notify_roles(
    store: &dyn DocumentStore,
    roles: &[UserRole],
    kind: NotificationKind,
    title: &str,
    message: &str,
) -> Result<Vec<String>, AppError> {
    let now = Utc::now();
    let mut ops = Vec::with_capacity(roles.len());
    for role in roles {
        let n = Notification::new(Recipient::Role(*role), kind, title, message, now);
        n.validate().map_err(AppError::Validation)?;
        ops.push(repository::insert_op(&n)?);
    }
    let ids = store.commit(ops).await?;
    tracing::debug!("{} notification(s) ({}) -> {:?}", ids.len(), kind.code(), roles);
    Ok(ids)
}

/// Побочное уведомление после основной записи: ошибка не отменяет
/// операцию, а попадает в `warnings` ответа.
pub async fn notify_best_effort(
    store: &dyn DocumentStore,
    notification: Notification,
    warnings: &mut Vec<String>,
) {
    if let Err(e) = notify(store, notification).await {
        tracing::warn!("Follow-up notification failed: {}", e);
        warnings.push(format!("Notification was not sent: {}", e));
    }
}

/// Уведомления пользователя: его роли, всем ролям и лично ему.
/// Новые сверху.
pub async fn list_for(
    store: &dyn DocumentStore,
    ctx: &UserContext,
) -> Result<Vec<NotificationListItem>, AppError> {
    let mut items = Vec::new();
    for collection in [NOTIFICATIONS, USER_NOTIFICATIONS] {
        for notification in repository::list(store, collection).await? {
            if notification.recipient.matches(ctx) {
                items.push(NotificationListItem {
                    notification,
                    collection: collection.to_string(),
                });
            }
        }
    }
    items.sort_by(|a, b| b.notification.created_at.cmp(&a.notification.created_at));
    Ok(items)
}

/// Отметить прочитанным. Только получатель.
pub async fn mark_read(
    store: &dyn DocumentStore,
    ctx: &UserContext,
    collection: &str,
    id: &str,
) -> Result<(), AppError> {
    if !repository::is_notification_collection(collection) {
        return Err(AppError::NotFound(format!("Unknown notification collection '{}'", collection)));
    }
    let notification = repository::get(store, collection, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;
    AppError::require(notification.recipient.matches(ctx), "read this notification")?;
    if notification.read {
        return Ok(());
    }
    repository::mark_read(store, collection, id).await?;
    Ok(())
}

/// Удаление: явное действие администратора
pub async fn delete(
    store: &dyn DocumentStore,
    ctx: &UserContext,
    collection: &str,
    id: &str,
) -> Result<(), AppError> {
    AppError::require(ctx.role.is_admin(), "delete notifications")?;
    if !repository::is_notification_collection(collection) {
        return Err(AppError::NotFound(format!("Unknown notification collection '{}'", collection)));
    }
    repository::delete(store, collection, id).await?;
    tracing::info!("Notification {}/{} deleted by {}", collection, id, ctx.uid);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::MemoryDocumentStore;

    fn staff() -> UserContext {
        UserContext::new("staff-1", UserRole::Staff)
    }

    fn admin() -> UserContext {
        UserContext::new("admin-1", UserRole::Admin)
    }

    fn to_all(title: &str, message: &str) -> Notification {
        Notification::new(
            Recipient::AllRoles,
            NotificationKind::AdminMessage,
            title,
            message,
            Utc::now(),
        )
    }

    fn to_user(uid: &str, title: &str, message: &str) -> Notification {
        Notification::new(
            Recipient::User(uid.into()),
            NotificationKind::RequestUpdate,
            title,
            message,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_list_for_filters_by_role_and_uid() {
        let store = MemoryDocumentStore::new();
        let roles = [UserRole::Admin, UserRole::Manager];
        notify_roles(&store, &roles, NotificationKind::LowStock, "Low", "Rice")
            .await
            .unwrap();
        notify(&store, to_all("All", "Hi")).await.unwrap();
        notify(&store, to_user("staff-1", "Yours", "Approved")).await.unwrap();
        notify(&store, to_user("other", "Theirs", "Rejected")).await.unwrap();

        let titles: Vec<_> = list_for(&store, &staff())
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.notification.title)
            .collect();
        assert_eq!(titles.len(), 2);
        assert!(titles.contains(&"All".to_string()));
        assert!(titles.contains(&"Yours".to_string()));

        assert_eq!(list_for(&store, &admin()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_notify_roles_is_all_or_nothing() {
        let store = MemoryDocumentStore::new();
        let roles = [UserRole::Admin, UserRole::Manager];
        let err = notify_roles(&store, &roles, NotificationKind::LowStock, " ", "Rice")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.list(NOTIFICATIONS).await.unwrap().is_empty());

        let ids = notify_roles(&store, &roles, NotificationKind::LowStock, "Low", "Rice")
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn test_only_recipient_marks_read() {
        let store = MemoryDocumentStore::new();
        let id = notify(&store, to_user("staff-1", "Yours", "Approved")).await.unwrap();

        let err = mark_read(&store, &admin(), USER_NOTIFICATIONS, &id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        mark_read(&store, &staff(), USER_NOTIFICATIONS, &id).await.unwrap();
        let items = list_for(&store, &staff()).await.unwrap();
        assert!(items[0].notification.read);
    }

    #[tokio::test]
    async fn test_delete_requires_admin() {
        let store = MemoryDocumentStore::new();
        let id = notify(&store, to_all("All", "Hi")).await.unwrap();
        assert!(matches!(
            delete(&store, &staff(), NOTIFICATIONS, &id).await,
            Err(AppError::Forbidden(_))
        ));
        delete(&store, &admin(), NOTIFICATIONS, &id).await.unwrap();
        assert!(list_for(&store, &admin()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_title_is_rejected() {
        let store = MemoryDocumentStore::new();
        let err = notify(&store, to_all(" ", "Hi")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
