use chrono::{DateTime, Utc};
use contracts::domain::a006_notification::{Notification, NotificationKind, Recipient};
use contracts::system::auth::UserRole;
use serde::{Deserialize, Serialize};

use crate::shared::data::collections::{NOTIFICATIONS, USER_NOTIFICATIONS};
use crate::shared::data::document_store::encode;
use crate::shared::data::{Document, DocumentStore, StoreError, WriteOp};

/// Значение `recipientRole` для уведомлений всем ролям
const ALL_ROLES: &str = "all";

/// Stored shape: role notifications carry `recipientRole`, user ones `recipientUid`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipient_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipient_uid: Option<String>,
    title: String,
    message: String,
    kind: NotificationKind,
    #[serde(default)]
    read: bool,
    created_at: DateTime<Utc>,
}

pub fn collection_for(recipient: &Recipient) -> &'static str {
    if recipient.is_user() {
        USER_NOTIFICATIONS
    } else {
        NOTIFICATIONS
    }
}

pub fn is_notification_collection(collection: &str) -> bool {
    collection == NOTIFICATIONS || collection == USER_NOTIFICATIONS
}

fn to_body(n: &Notification) -> Result<serde_json::Value, StoreError> {
    let (recipient_role, recipient_uid) = match &n.recipient {
        Recipient::AllRoles => (Some(ALL_ROLES.to_string()), None),
        Recipient::Role(role) => (Some(role.code().to_string()), None),
        Recipient::User(uid) => (None, Some(uid.clone())),
    };
    encode(&NotificationBody {
        recipient_role,
        recipient_uid,
        title: n.title.clone(),
        message: n.message.clone(),
        kind: n.kind,
        read: n.read,
        created_at: n.created_at,
    })
}

pub fn from_document(doc: &Document) -> Result<Notification, StoreError> {
    let body: NotificationBody = serde_json::from_value(doc.data.clone())?;
    let recipient = match (body.recipient_uid, body.recipient_role) {
        (Some(uid), _) => Recipient::User(uid),
        (None, Some(role)) if role.eq_ignore_ascii_case(ALL_ROLES) => Recipient::AllRoles,
        (None, Some(role)) => Recipient::Role(UserRole::from_code(&role).ok_or_else(|| {
            StoreError::InvalidDocument(format!("notification {}: unknown role '{}'", doc.id, role))
        })?),
        (None, None) => {
            return Err(StoreError::InvalidDocument(format!(
                "notification {} has no recipient",
                doc.id
            )))
        }
    };
    Ok(Notification {
        id: doc.id.clone(),
        recipient,
        title: body.title,
        message: body.message,
        kind: body.kind,
        read: body.read,
        created_at: body.created_at,
    })
}

pub async fn insert(store: &dyn DocumentStore, n: &Notification) -> Result<String, StoreError> {
    store.insert(collection_for(&n.recipient), to_body(n)?).await
}

/// Вставка уведомления для пакетного commit
pub fn insert_op(n: &Notification) -> Result<WriteOp, StoreError> {
    Ok(WriteOp::insert(collection_for(&n.recipient), to_body(n)?))
}

/// Все уведомления коллекции; битые документы пропускаются
pub async fn list(
    store: &dyn DocumentStore,
    collection: &str,
) -> Result<Vec<Notification>, StoreError> {
    let docs = store.list(collection).await?;
    Ok(docs
        .iter()
        .filter_map(|doc| match from_document(doc) {
            Ok(n) => Some(n),
            Err(e) => {
                tracing::warn!("Skipping notification: {}", e);
                None
            }
        })
        .collect())
}

pub async fn get(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<Option<Notification>, StoreError> {
    store
        .get(collection, id)
        .await?
        .map(|doc| from_document(&doc))
        .transpose()
}

pub async fn mark_read(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<(), StoreError> {
    store
        .update(collection, id, serde_json::json!({ "read": true }))
        .await
}

pub async fn delete(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<(), StoreError> {
    store.delete(collection, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_and_user_recipients_use_their_fields() {
        let n = Notification::new(
            Recipient::Role(UserRole::Manager),
            NotificationKind::LowStock,
            "Low stock",
            "Rice is low",
            Utc::now(),
        );
        let body = to_body(&n).unwrap();
        assert_eq!(body["recipientRole"], json!("manager"));
        assert!(body.get("recipientUid").is_none());
        assert_eq!(collection_for(&n.recipient), NOTIFICATIONS);

        let n = Notification::new(
            Recipient::User("u-1".into()),
            NotificationKind::AdminMessage,
            "Hello",
            "Body",
            Utc::now(),
        );
        let body = to_body(&n).unwrap();
        assert_eq!(body["recipientUid"], json!("u-1"));
        assert_eq!(collection_for(&n.recipient), USER_NOTIFICATIONS);
    }

    #[test]
    fn test_all_roles_round_trip() {
        let doc = Document::new(
            "n1",
            json!({
                "recipientRole": "all",
                "title": "Maintenance",
                "message": "Tonight",
                "kind": "admin_message",
                "createdAt": "2026-10-17T08:00:00Z"
            }),
        );
        let n = from_document(&doc).unwrap();
        assert_eq!(n.recipient, Recipient::AllRoles);
        assert!(!n.read);

        let bad = Document::new(
            "n2",
            json!({
                "title": "x",
                "message": "y",
                "kind": "expiry",
                "createdAt": "2026-10-17T08:00:00Z"
            }),
        );
        assert!(from_document(&bad).is_err());
    }
}
