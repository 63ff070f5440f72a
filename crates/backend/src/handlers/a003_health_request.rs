use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a003_health_request::{HealthRequest, HealthRequestDto, RequestDecisionDto};
use contracts::shared::api::MutationResponse;

use crate::domain::a003_health_request;
use crate::shared::app_state::AppState;
use crate::shared::error::AppError;
use crate::system::auth::CurrentUser;

/// GET /api/requests
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<Vec<HealthRequest>>, AppError> {
    Ok(Json(a003_health_request::service::list_for(state.store.as_ref(), &ctx).await?))
}

/// POST /api/requests
pub async fn submit(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(dto): Json<HealthRequestDto>,
) -> Result<(StatusCode, Json<HealthRequest>), AppError> {
    let request = a003_health_request::service::submit(state.store.as_ref(), &ctx, &dto).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// POST /api/requests/:id/approve
pub async fn approve(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
    body: Option<Json<RequestDecisionDto>>,
) -> Result<Json<MutationResponse<HealthRequest>>, AppError> {
    let dto = body.map(|Json(d)| d).unwrap_or_default();
    Ok(Json(a003_health_request::service::approve(&state, &ctx, &id, &dto).await?))
}

/// POST /api/requests/:id/reject
pub async fn reject(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
    body: Option<Json<RequestDecisionDto>>,
) -> Result<Json<MutationResponse<HealthRequest>>, AppError> {
    let dto = body.map(|Json(d)| d).unwrap_or_default();
    Ok(Json(
        a003_health_request::service::reject(state.store.as_ref(), &ctx, &id, &dto).await?,
    ))
}
