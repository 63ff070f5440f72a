use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a001_inventory_item::{ConditionDto, DeductDto, InventoryItemDto, TaggedItem};
use contracts::enums::{InventoryCategory, StockStatus};
use contracts::shared::api::MutationResponse;
use contracts::shared::list_view::{parse_code_list, ListViewQuery, SortDirection, SortKey};
use serde::Deserialize;

use crate::domain::a001_inventory_item;
use crate::shared::app_state::AppState;
use crate::shared::error::AppError;
use crate::system::auth::CurrentUser;

/// Query string of GET /api/inventory
#[derive(Debug, Default, Deserialize)]
pub struct InventoryListParams {
    pub categories: Option<String>,
    pub statuses: Option<String>,
    pub q: Option<String>,
    pub campus: Option<String>,
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_desc: bool,
}

impl InventoryListParams {
    pub fn to_query(&self) -> Result<ListViewQuery, AppError> {
        let categories = parse_code_list(self.categories.as_deref(), InventoryCategory::from_code)
            .map_err(AppError::Validation)?;
        let statuses = parse_code_list(self.statuses.as_deref(), StockStatus::from_code)
            .map_err(AppError::Validation)?;
        let sort = match self.sort_by.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(code) => {
                let key = SortKey::from_code(code)
                    .ok_or_else(|| AppError::Validation(format!("Unknown sort key '{}'", code)))?;
                let direction = if self.sort_desc {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                };
                Some((key, direction))
            }
            None => None,
        };
        Ok(ListViewQuery {
            categories,
            statuses,
            search: self.q.clone().unwrap_or_default(),
            campus_ref: self.campus.clone().filter(|c| !c.trim().is_empty()),
            sort,
        })
    }
}

pub(crate) fn parse_category(code: &str) -> Result<InventoryCategory, AppError> {
    InventoryCategory::from_code(code)
        .ok_or_else(|| AppError::Validation(format!("Unknown category '{}'", code)))
}

/// GET /api/inventory
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<InventoryListParams>,
) -> Result<Json<Vec<TaggedItem>>, AppError> {
    let query = params.to_query()?;
    let items = a001_inventory_item::service::list_view(&state, &query, state.today()).await?;
    Ok(Json(items))
}

/// GET /api/inventory/:category/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((category, id)): Path<(String, String)>,
) -> Result<Json<TaggedItem>, AppError> {
    let category = parse_category(&category)?;
    let item = a001_inventory_item::service::get(&state, category, &id, state.today()).await?;
    Ok(Json(item))
}

/// POST /api/inventory
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Json(dto): Json<InventoryItemDto>,
) -> Result<(StatusCode, Json<MutationResponse<TaggedItem>>), AppError> {
    let created = a001_inventory_item::service::create(&state, &ctx, &dto, state.today()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/inventory/:category/:id
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path((category, id)): Path<(String, String)>,
    Json(dto): Json<InventoryItemDto>,
) -> Result<Json<MutationResponse<TaggedItem>>, AppError> {
    let category = parse_category(&category)?;
    let today = state.today();
    let updated =
        a001_inventory_item::service::update(&state, &ctx, category, &id, &dto, today).await?;
    Ok(Json(updated))
}

/// POST /api/inventory/:category/:id/condition
pub async fn set_condition(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path((category, id)): Path<(String, String)>,
    Json(dto): Json<ConditionDto>,
) -> Result<Json<TaggedItem>, AppError> {
    let category = parse_category(&category)?;
    let item = a001_inventory_item::service::set_condition(
        &state,
        &ctx,
        category,
        &id,
        dto.condition,
        state.today(),
    )
    .await?;
    Ok(Json(item))
}

/// POST /api/inventory/:category/:id/deduct
pub async fn deduct(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path((category, id)): Path<(String, String)>,
    Json(dto): Json<DeductDto>,
) -> Result<Json<MutationResponse<TaggedItem>>, AppError> {
    let category = parse_category(&category)?;
    let units = dto.validated_units().map_err(AppError::Validation)?;
    let today = state.today();
    let result =
        a001_inventory_item::service::deduct(&state, &ctx, category, &id, units, today).await?;
    Ok(Json(result))
}

/// DELETE /api/inventory/:category/:id
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(ctx): CurrentUser,
    Path((category, id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let category = parse_category(&category)?;
    a001_inventory_item::service::delete(&state, &ctx, category, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
