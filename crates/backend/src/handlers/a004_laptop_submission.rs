use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a004_laptop_submission::{LaptopSubmission, LaptopSubmissionDto};
use contracts::domain::a005_laptop_return::{LaptopReturn, LaptopReturnDto};
use contracts::shared::api::MutationResponse;

use crate::domain::{a004_laptop_submission, a005_laptop_return};
use crate::shared::app_state::AppState;
use crate::shared::error::AppError;
use crate::system::auth::CurrentUser;

/// GET /api/laptops/submissions
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<Vec<LaptopSubmission>>, AppError> {
    Ok(Json(a004_laptop_submission::service::list_for(state.store.as_ref(), &ctx).await?))
}

/// POST /api/laptops/submissions
pub async fn submit(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(dto): Json<LaptopSubmissionDto>,
) -> Result<(StatusCode, Json<LaptopSubmission>), AppError> {
    let submission =
        a004_laptop_submission::service::submit(state.store.as_ref(), &ctx, &dto).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// POST /api/laptops/submissions/:id/return
pub async fn process_return(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path(id): Path<String>,
    body: Option<Json<LaptopReturnDto>>,
) -> Result<Json<MutationResponse<LaptopReturn>>, AppError> {
    let dto = body.map(|Json(d)| d).unwrap_or_default();
    Ok(Json(
        a005_laptop_return::service::process_return(state.store.as_ref(), &ctx, &id, &dto).await?,
    ))
}
