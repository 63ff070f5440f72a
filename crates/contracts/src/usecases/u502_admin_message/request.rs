use serde::{Deserialize, Serialize};

/// Сообщение администратора пользователю: уведомление + письмо
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminMessageRequest {
    pub recipient_uid: String,
    /// Если не задан, письмо не отправляется, только уведомление
    pub recipient_email: Option<String>,
    pub subject: String,
    pub body: String,
}

impl AdminMessageRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.recipient_uid.trim().is_empty() {
            return Err("Recipient must not be empty".into());
        }
        if self.subject.trim().is_empty() {
            return Err("Subject must not be empty".into());
        }
        if self.body.trim().is_empty() {
            return Err("Message body must not be empty".into());
        }
        if let Some(email) = self.recipient_email.as_deref() {
            if !email.trim().is_empty() && !email.contains('@') {
                return Err(format!("Invalid email address '{}'", email));
            }
        }
        Ok(())
    }
}
