use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{repo::Category, DISH_CATEGORY, SETMEAL_CATEGORY};
use crate::{
    auth::AuthEmployee,
    common::{ApiResult, Audit},
    error::{AppError, AppResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CategoryDto {
    #[serde(rename = "type")]
    pub kind: i32,
    pub name: String,
    #[serde(default)]
    pub sort: i32,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type", default)]
    pub kind: Option<i32>,
}

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/category", post(save))
        .route("/admin/category/list", get(list))
}

fn validate(dto: &CategoryDto) -> AppResult<()> {
    if dto.kind != DISH_CATEGORY && dto.kind != SETMEAL_CATEGORY {
        return Err(AppError::BadRequest(format!("unknown category type {}", dto.kind)));
    }
    if dto.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn save(
    State(state): State<AppState>,
    AuthEmployee(actor): AuthEmployee,
    Json(payload): Json<CategoryDto>,
) -> AppResult<Json<ApiResult<Uuid>>> {
    validate(&payload)?;
    let id = Uuid::new_v4();
    Category::insert(
        &state.db,
        id,
        payload.kind,
        payload.name.trim(),
        payload.sort,
        Audit::now(actor),
    )
    .await?;
    info!(category_id = %id, "category created");
    Ok(Json(ApiResult::success(id)))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthEmployee(_): AuthEmployee,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<ApiResult<Vec<Category>>>> {
    let rows = Category::list(&state.db, q.kind).await?;
    Ok(Json(ApiResult::success(rows)))
}
