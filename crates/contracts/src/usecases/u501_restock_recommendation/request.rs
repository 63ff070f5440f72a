use crate::enums::InventoryCategory;
use serde::{Deserialize, Serialize};

/// Запрос рекомендации по пополнению для одной позиции
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub category: InventoryCategory,
    pub item_id: String,
    /// Дополнительный контекст от пользователя (необязательно)
    pub note: Option<String>,
}
