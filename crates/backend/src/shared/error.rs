use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::shared::api::ErrorBody;
use thiserror::Error;

use crate::shared::data::StoreError;
use crate::shared::feed::FeedNotReady;

/// Ошибка сервисного слоя. Каждая ошибка отдается клиенту как
/// `{ "error": "..." }` и показывается в интерфейсе как toast.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Loading(#[from] FeedNotReady),

    #[error("Storage error: {0}")]
    Store(StoreError),

    #[error("External service error: {0}")]
    External(String),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { collection, id } => {
                AppError::NotFound(format!("{} {} not found", collection, id))
            }
            StoreError::PreconditionFailed { collection, id, .. } => AppError::Conflict(format!(
                "{} {} was changed by another request, reload and try again",
                collection, id
            )),
            other => AppError::Store(other),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Loading(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::External(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Check a permission; `action` ends up in the message
    pub fn require(allowed: bool, action: &str) -> Result<(), AppError> {
        if allowed {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("Not allowed to {}", action)))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_404() {
        let err: AppError = StoreError::not_found("laptops", "l-9").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "laptops l-9 not found");
    }

    #[test]
    fn test_failed_guard_maps_to_409() {
        let err: AppError = StoreError::PreconditionFailed {
            collection: "health_requests".into(),
            id: "r1".into(),
            field: "status".into(),
            expected: serde_json::json!("pending"),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_loading_maps_to_503() {
        let err: AppError = FeedNotReady {
            delivered: 2,
            expected: 5,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_require() {
        assert!(AppError::require(true, "delete notifications").is_ok());
        let err = AppError::require(false, "delete notifications").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
