use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::common::ApiResult;

/// Errors surfaced by services and turned into HTTP responses by handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The identity provider gave back no usable openid.
    #[error("login failed")]
    LoginFailed,

    #[error("unauthorized")]
    Unauthorized,

    #[error("account locked")]
    AccountLocked,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0}")]
    DeletionNotAllowed(String),

    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(#[source] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::AlreadyExists("record".into())
            }
            _ => AppError::PersistenceUnavailable(e),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::LoginFailed | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::AccountLocked => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) | AppError::DeletionNotAllowed(_) => StatusCode::CONFLICT,
            AppError::PersistenceUnavailable(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = if status.is_server_error() {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ApiResult::<()>::error(msg))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(AppError::LoginFailed.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::AccountLocked.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::DeletionNotAllowed("on sale".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(sqlx::Error::PoolTimedOut).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_errors_hide_details() {
        let res = AppError::from(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let res = AppError::NotFound("dish".into()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
