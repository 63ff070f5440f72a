use crate::enums::StockStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub item_id: String,
    pub item_name: String,
    pub status: StockStatus,
    pub recommendation_text: String,
    pub model: String,
    /// Сколько попыток понадобилось (1..=max_attempts)
    pub attempts: u32,
}
