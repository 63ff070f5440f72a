use axum::extract::State;
use axum::Json;
use contracts::domain::a005_laptop_return::LaptopReturn;

use crate::domain::a005_laptop_return;
use crate::shared::app_state::AppState;
use crate::shared::error::AppError;
use crate::system::auth::CurrentUser;

/// GET /api/laptops/returns
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<LaptopReturn>>, AppError> {
    Ok(Json(a005_laptop_return::service::list_all(state.store.as_ref()).await?))
}
