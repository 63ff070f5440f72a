use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a006_notification::NotificationListItem;

use crate::domain::a006_notification;
use crate::shared::app_state::AppState;
use crate::shared::error::AppError;
use crate::system::auth::CurrentUser;

/// GET /api/notifications
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
) -> Result<Json<Vec<NotificationListItem>>, AppError> {
    Ok(Json(a006_notification::service::list_for(state.store.as_ref(), &ctx).await?))
}

/// POST /api/notifications/:collection/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    a006_notification::service::mark_read(state.store.as_ref(), &ctx, &collection, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/notifications/:collection/:id
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    a006_notification::service::delete(state.store.as_ref(), &ctx, &collection, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
