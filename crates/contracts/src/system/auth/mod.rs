//! Контекст пользователя.
//!
//! Аутентификация выполняется внешним провайдером; сервис получает уже
//! разрешенную запись {uid, email, displayName, role} и передает ее
//! явно во все операции, которым нужна роль.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    Staff,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Manager, UserRole::Staff];

    pub fn code(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Staff => "staff",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "manager" => Some(UserRole::Manager),
            "staff" | "user" => Some(UserRole::Staff),
            _ => None,
        }
    }

    /// Создание, редактирование и удаление записей инвентаря
    pub fn can_manage_inventory(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Manager)
    }

    /// Одобрение и отклонение заявок, обработка возвратов
    pub fn can_decide_requests(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Manager)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: UserRole,
}

impl UserContext {
    pub fn new(uid: impl Into<String>, role: UserRole) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            role,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Имя для подписей: displayName, затем email, затем uid
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}
