use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{DishDto, DishPageQuery},
    repo_types::DishView,
    services,
};
use crate::{
    auth::AuthEmployee,
    common::{ApiResult, PageResult},
    error::AppResult,
    state::AppState,
};

pub fn dish_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dish", post(save))
        .route("/admin/dish/page", get(page))
}

#[instrument(skip(state, payload))]
pub async fn save(
    State(state): State<AppState>,
    AuthEmployee(actor): AuthEmployee,
    Json(payload): Json<DishDto>,
) -> AppResult<Json<ApiResult<Uuid>>> {
    let id = services::save_with_flavor(&state.db, &payload, actor).await?;
    Ok(Json(ApiResult::success(id)))
}

#[instrument(skip(state))]
pub async fn page(
    State(state): State<AppState>,
    AuthEmployee(_): AuthEmployee,
    Query(q): Query<DishPageQuery>,
) -> AppResult<Json<ApiResult<PageResult<DishView>>>> {
    let result = services::query_page(&state.db, q).await?;
    Ok(Json(ApiResult::success(result)))
}
