use axum::extract::{Query, State};
use axum::Json;
use contracts::dashboards::d400_inventory_overview::InventoryOverview;
use serde::Deserialize;

use crate::dashboards::d400_inventory_overview;
use crate::shared::app_state::AppState;
use crate::shared::error::AppError;
use crate::system::auth::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct OverviewParams {
    pub campus: Option<String>,
}

/// GET /api/d400/overview
pub async fn get_overview(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<OverviewParams>,
) -> Result<Json<InventoryOverview>, AppError> {
    let campus = params.campus.filter(|c| !c.trim().is_empty());
    let today = state.today();
    let overview = d400_inventory_overview::service::get_overview(&state, campus, today).await?;
    Ok(Json(overview))
}
