use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminMessageResponse {
    pub notification_id: String,
    /// None, если email получателя не указан
    pub delivery: Option<DeliveryReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Relay,
    MailClient,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    pub method: DeliveryMethod,
    /// Ссылка mailto: для передачи в почтовый клиент
    pub handoff_link: Option<String>,
    /// Ошибки транспортов, пропущенных до успешного
    pub skipped: Vec<String>,
}
