use axum::{
    extract::{FromRef, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{UserLoginRequest, UserLoginResponse, UserPageQuery},
    repo_types::User,
    services::UserService,
};
use crate::{
    auth::{AuthEmployee, AuthUser, JwtKeys, TokenKind},
    common::{ApiResult, PageResult},
    error::AppResult,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/user/login", post(login))
        .route("/user/user/me", get(me))
        .route("/admin/user/page", get(page))
        .route("/admin/user/count", get(count))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<UserLoginRequest>,
) -> AppResult<Json<ApiResult<UserLoginResponse>>> {
    let users = UserService::from_ref(&state);
    let user = users.login(&payload.code).await?;

    let token = JwtKeys::from_ref(&state).sign(user.id, TokenKind::User)?;

    info!(user_id = %user.id, "wechat user logged in");
    Ok(Json(ApiResult::success(UserLoginResponse {
        id: user.id,
        openid: user.openid,
        token,
    })))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ApiResult<User>>> {
    let user = UserService::from_ref(&state).get(user_id).await?;
    Ok(Json(ApiResult::success(user)))
}

#[instrument(skip(state))]
pub async fn page(
    State(state): State<AppState>,
    AuthEmployee(_): AuthEmployee,
    Query(q): Query<UserPageQuery>,
) -> AppResult<Json<ApiResult<PageResult<User>>>> {
    let result = UserService::from_ref(&state)
        .page(q.name, q.page, q.page_size)
        .await?;
    Ok(Json(ApiResult::success(result)))
}

#[instrument(skip(state))]
pub async fn count(
    State(state): State<AppState>,
    AuthEmployee(_): AuthEmployee,
) -> AppResult<Json<ApiResult<i64>>> {
    let total = UserService::from_ref(&state).count().await?;
    Ok(Json(ApiResult::success(total)))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        app::build_app,
        auth::{JwtKeys, TokenKind},
        error::AppError,
        state::AppState,
        user::repo::memory::MemoryUserStore,
        wechat::IdentityProvider,
    };

    /// Answers only after `delay`; `finished` flips if it ever gets that far.
    struct SlowProvider {
        delay: Duration,
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl IdentityProvider for SlowProvider {
        async fn resolve_openid(&self, _code: &str) -> Result<String, AppError> {
            tokio::time::sleep(self.delay).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok("wx-slow".into())
        }
    }

    async fn get_json(app: axum::Router, uri: &str, token: &str) -> (StatusCode, Value) {
        let req = Request::get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn post_login(app: axum::Router, code: &str) -> (StatusCode, Value) {
        let req = Request::post("/user/user/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::json!({ "code": code }).to_string()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn login_returns_user_and_token() {
        let app = build_app(AppState::fake());
        let (status, body) = post_login(app, "abc123").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 1);
        assert_eq!(body["data"]["openid"], "wx-001");
        assert!(body["data"]["token"].as_str().unwrap().len() > 20);
    }

    #[tokio::test]
    async fn login_with_rejected_code_is_unauthorized() {
        let app = build_app(AppState::fake());
        let (status, body) = post_login(app, "bad").await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 0);
        assert_eq!(body["msg"], "login failed");
    }

    #[tokio::test]
    async fn me_uses_the_login_token() {
        let state = AppState::fake();
        let (_, body) = post_login(build_app(state.clone()), "abc123").await;
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let req = Request::get("/user/user/me")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let res = build_app(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["openid"], "wx-001");
    }

    #[tokio::test]
    async fn me_without_token_is_unauthorized() {
        let req = Request::get("/user/user/me").body(Body::empty()).unwrap();
        let res = build_app(AppState::fake()).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn slow_provider_is_cut_off_by_request_timeout() {
        let base = AppState::fake();
        let mut config = (*base.config).clone();
        config.request_timeout_secs = 1;

        let finished = Arc::new(AtomicBool::new(false));
        let store = Arc::new(MemoryUserStore::new());
        let state = AppState::from_parts(
            base.db.clone(),
            Arc::new(config),
            Arc::new(SlowProvider {
                delay: Duration::from_secs(2),
                finished: finished.clone(),
            }),
            store.clone(),
        );

        let req = Request::post("/user/user/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"code":"abc123"}"#))
            .unwrap();
        let res = build_app(state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);

        // the dropped handler never resumes, so the provider call never completes
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!finished.load(Ordering::SeqCst));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn admin_lists_and_counts_customers() {
        let state = AppState::fake();
        let (status, _) = post_login(build_app(state.clone()), "abc123").await;
        assert_eq!(status, StatusCode::OK);

        let keys = JwtKeys::from(&state.config.jwt);
        let admin = keys.sign(Uuid::new_v4(), TokenKind::Employee).unwrap();

        let uri = "/admin/user/page?page=1&pageSize=10";
        let (status, body) = get_json(build_app(state.clone()), uri, &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["records"][0]["openid"], "wx-001");

        let (status, body) =
            get_json(build_app(state.clone()), "/admin/user/page?name=nobody", &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 0);

        let (status, body) = get_json(build_app(state.clone()), "/admin/user/count", &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], 1);

        // customer tokens do not open the admin listing
        let customer = keys.sign(Uuid::new_v4(), TokenKind::User).unwrap();
        let (status, _) = get_json(build_app(state), "/admin/user/count", &customer).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
