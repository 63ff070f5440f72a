use crate::system::auth::{UserContext, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    LowStock,
    OutOfStock,
    Expiry,
    RequestUpdate,
    RoleChange,
    ForcedLogout,
    AdminMessage,
}

impl NotificationKind {
    pub fn code(&self) -> &'static str {
        match self {
            NotificationKind::LowStock => "low_stock",
            NotificationKind::OutOfStock => "out_of_stock",
            NotificationKind::Expiry => "expiry",
            NotificationKind::RequestUpdate => "request_update",
            NotificationKind::RoleChange => "role_change",
            NotificationKind::ForcedLogout => "forced_logout",
            NotificationKind::AdminMessage => "admin_message",
        }
    }
}

/// Получатель уведомления: роль, все роли или конкретный пользователь
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Recipient {
    AllRoles,
    Role(UserRole),
    User(String),
}

impl Recipient {
    pub fn matches(&self, ctx: &UserContext) -> bool {
        match self {
            Recipient::AllRoles => true,
            Recipient::Role(role) => *role == ctx.role,
            Recipient::User(uid) => *uid == ctx.uid,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Recipient::User(_))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub recipient: Recipient,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient: Recipient,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: String::new(),
            recipient,
            title: title.into(),
            message: message.into(),
            kind,
            read: false,
            created_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Notification title must not be empty".into());
        }
        if self.message.trim().is_empty() {
            return Err("Notification message must not be empty".into());
        }
        Ok(())
    }

    pub fn mark_read(&mut self) {
        self.read = true;
    }
}

/// Элемент списка уведомлений: запись плюс коллекция, в которой она лежит
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListItem {
    #[serde(flatten)]
    pub notification: Notification,
    pub collection: String,
}
