use axum::extract::State;
use axum::Json;
use contracts::usecases::u501_restock_recommendation::{
    RecommendationRequest, RecommendationResponse,
};
use contracts::usecases::u502_admin_message::{AdminMessageRequest, AdminMessageResponse};

use crate::shared::app_state::AppState;
use crate::shared::error::AppError;
use crate::system::auth::CurrentUser;
use crate::usecases::{u501_restock_recommendation, u502_admin_message};

/// POST /api/u501/recommendation
pub async fn u501_recommendation(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let executor = u501_restock_recommendation::RecommendationExecutor::new(state);
    Ok(Json(executor.execute(&request).await?))
}

/// POST /api/u502/message
pub async fn u502_message(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(request): Json<AdminMessageRequest>,
) -> Result<Json<AdminMessageResponse>, AppError> {
    Ok(Json(u502_admin_message::executor::execute(&state, &ctx, &request).await?))
}
