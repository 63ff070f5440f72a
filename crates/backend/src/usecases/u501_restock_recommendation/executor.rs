use contracts::domain::a001_inventory_item::TaggedItem;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_restock_recommendation::{
    RecommendationRequest, RecommendationResponse, RestockRecommendation,
};

use crate::domain::a001_inventory_item;
use crate::shared::app_state::AppState;
use crate::shared::error::AppError;
use crate::shared::llm::{ChatMessage, LlmError};
use crate::shared::retry::retry_with_backoff;

const SYSTEM_PROMPT: &str = "You are an inventory assistant for a multi-campus organisation. \
Given one inventory item, recommend how many units to reorder and how soon. \
Answer in at most three short sentences.";

/// Executor для UseCase рекомендации по пополнению.
/// Единственный внешний вызов, который повторяется при сбоях.
pub struct RecommendationExecutor {
    state: AppState,
}

impl RecommendationExecutor {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn execute(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, AppError> {
        let today = self.state.today();
        let tagged = a001_inventory_item::service::get(
            &self.state,
            request.category,
            &request.item_id,
            today,
        )
        .await?;
        let threshold = self.state.thresholds.for_category(tagged.item.category);
        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(item_context(&tagged, threshold, request.note.as_deref())),
        ];

        let policy = self.state.config.llm.retry_policy();
        let llm = self.state.llm.clone();
        let result = retry_with_backoff(&policy, LlmError::is_retryable, |attempt| {
            let llm = llm.clone();
            let messages = messages.clone();
            async move {
                tracing::debug!(
                    "Recommendation attempt {} via {}",
                    attempt + 1,
                    llm.provider_name()
                );
                llm.chat_completion(messages).await
            }
        })
        .await
        .map_err(|e| AppError::External(e.to_string()))?;

        tracing::info!(
            "{}: recommendation for '{}' generated in {} attempt(s)",
            RestockRecommendation::full_name(),
            tagged.item.name,
            result.attempts
        );
        Ok(RecommendationResponse {
            item_id: tagged.item.id.clone(),
            item_name: tagged.item.name.clone(),
            status: tagged.status,
            recommendation_text: result.value.content.trim().to_string(),
            model: result.value.model,
            attempts: result.attempts,
        })
    }
}

/// Описание позиции для промпта
fn item_context(tagged: &TaggedItem, threshold: u32, note: Option<&str>) -> String {
    let item = &tagged.item;
    let mut lines = vec![
        format!("Item: {}", item.name),
        format!("Category: {}", item.category),
        format!("Quantity on hand: {}", item.quantity),
        format!("Low stock threshold: {}", threshold),
        format!("Status: {}", tagged.status_label),
    ];
    if let Some(expiry) = item.expiry_date {
        lines.push(format!("Expiry date: {}", expiry));
    }
    if let Some(supplier) = &item.supplier {
        lines.push(format!("Supplier: {}", supplier));
    }
    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        lines.push(format!("Operator note: {}", note));
    }
    lines.join("\n")
}
