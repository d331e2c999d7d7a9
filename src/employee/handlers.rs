use axum::{
    extract::{FromRef, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{EmployeeDto, EmployeeLoginRequest, EmployeeLoginResponse, EmployeePageQuery, StatusQuery},
    repo_types::Employee,
    services,
};
use crate::{
    auth::{AuthEmployee, JwtKeys, TokenKind},
    common::{ApiResult, PageResult},
    error::AppResult,
    state::AppState,
};

pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/employee/login", post(login))
        .route("/admin/employee", post(save).put(update))
        .route("/admin/employee/page", get(page))
        .route("/admin/employee/status/:status", post(set_status))
        .route("/admin/employee/:id", get(get_by_id))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<EmployeeLoginRequest>,
) -> AppResult<Json<ApiResult<EmployeeLoginResponse>>> {
    let employee = services::login(&state.db, &payload.username, &payload.password).await?;
    let token = JwtKeys::from_ref(&state).sign(employee.id, TokenKind::Employee)?;

    info!(employee_id = %employee.id, "employee logged in");
    Ok(Json(ApiResult::success(EmployeeLoginResponse {
        id: employee.id,
        username: employee.username,
        name: employee.name,
        token,
    })))
}

#[instrument(skip(state, payload))]
pub async fn save(
    State(state): State<AppState>,
    AuthEmployee(actor): AuthEmployee,
    Json(payload): Json<EmployeeDto>,
) -> AppResult<Json<ApiResult<Uuid>>> {
    let id = services::save(&state.db, &payload, actor).await?;
    Ok(Json(ApiResult::success(id)))
}

#[instrument(skip(state))]
pub async fn page(
    State(state): State<AppState>,
    AuthEmployee(_): AuthEmployee,
    Query(q): Query<EmployeePageQuery>,
) -> AppResult<Json<ApiResult<PageResult<Employee>>>> {
    let result = services::page(&state.db, q.name, q.page, q.page_size).await?;
    Ok(Json(ApiResult::success(result)))
}

#[instrument(skip(state))]
pub async fn get_by_id(
    State(state): State<AppState>,
    AuthEmployee(_): AuthEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResult<Employee>>> {
    let employee = services::get(&state.db, id).await?;
    Ok(Json(ApiResult::success(employee)))
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    AuthEmployee(actor): AuthEmployee,
    Json(payload): Json<EmployeeDto>,
) -> AppResult<Json<ApiResult<()>>> {
    services::update(&state.db, &payload, actor).await?;
    Ok(Json(ApiResult::ok()))
}

#[instrument(skip(state))]
pub async fn set_status(
    State(state): State<AppState>,
    AuthEmployee(actor): AuthEmployee,
    Path(status): Path<i32>,
    Query(q): Query<StatusQuery>,
) -> AppResult<Json<ApiResult<()>>> {
    services::set_status(&state.db, q.id, status, actor).await?;
    Ok(Json(ApiResult::ok()))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        app::build_app,
        auth::{JwtKeys, TokenKind},
        state::AppState,
    };

    #[tokio::test]
    async fn admin_routes_need_an_employee_token() {
        let state = AppState::fake();
        let req = Request::get("/admin/employee/page").body(Body::empty()).unwrap();
        let res = build_app(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        // customer tokens do not open admin endpoints
        let keys = JwtKeys::from(&state.config.jwt);
        let user_token = keys.sign(Uuid::new_v4(), TokenKind::User).unwrap();
        let req = Request::get("/admin/employee/page")
            .header(header::AUTHORIZATION, format!("Bearer {user_token}"))
            .body(Body::empty())
            .unwrap();
        let res = build_app(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
