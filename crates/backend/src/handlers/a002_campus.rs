use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a002_campus::{Campus, CampusDto};

use crate::domain::a002_campus;
use crate::shared::app_state::AppState;
use crate::shared::error::AppError;
use crate::system::auth::CurrentUser;

/// GET /api/campus
pub async fn list_all(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Campus>>, AppError> {
    Ok(Json(a002_campus::service::list_all(state.store.as_ref()).await?))
}

/// POST /api/campus
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(dto): Json<CampusDto>,
) -> Result<(StatusCode, Json<Campus>), AppError> {
    let campus = a002_campus::service::create(state.store.as_ref(), &ctx, &dto).await?;
    Ok((StatusCode::CREATED, Json(campus)))
}
