use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{IdsQuery, SetmealDto, SetmealPageQuery},
    repo_types::{SetmealDetail, SetmealView},
    services,
};
use crate::{
    auth::AuthEmployee,
    common::{ApiResult, PageResult},
    error::AppResult,
    state::AppState,
};

pub fn setmeal_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/setmeal", post(save).delete(delete_batch))
        .route("/admin/setmeal/page", get(page))
        .route("/admin/setmeal/:id", get(get_by_id))
}

#[instrument(skip(state, payload))]
pub async fn save(
    State(state): State<AppState>,
    AuthEmployee(actor): AuthEmployee,
    Json(payload): Json<SetmealDto>,
) -> AppResult<Json<ApiResult<Uuid>>> {
    let id = services::save_with_dish(&state.db, &payload, actor).await?;
    Ok(Json(ApiResult::success(id)))
}

#[instrument(skip(state))]
pub async fn page(
    State(state): State<AppState>,
    AuthEmployee(_): AuthEmployee,
    Query(q): Query<SetmealPageQuery>,
) -> AppResult<Json<ApiResult<PageResult<SetmealView>>>> {
    let result = services::query_page(&state.db, q).await?;
    Ok(Json(ApiResult::success(result)))
}

#[instrument(skip(state))]
pub async fn delete_batch(
    State(state): State<AppState>,
    AuthEmployee(_): AuthEmployee,
    Query(q): Query<IdsQuery>,
) -> AppResult<Json<ApiResult<()>>> {
    let ids = services::parse_ids(&q.ids)?;
    services::delete_batch(&state.db, &ids).await?;
    Ok(Json(ApiResult::ok()))
}

#[instrument(skip(state))]
pub async fn get_by_id(
    State(state): State<AppState>,
    AuthEmployee(_): AuthEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResult<SetmealDetail>>> {
    let detail = services::get_by_id(&state.db, id).await?;
    Ok(Json(ApiResult::success(detail)))
}
