use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::{JwtKeys, TokenKind};
use crate::error::AppError;

/// Authenticated back-office employee id.
pub struct AuthEmployee(pub Uuid);

/// Authenticated mini-program customer id.
pub struct AuthUser(pub Uuid);

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or(AppError::Unauthorized)
}

fn subject_of(parts: &Parts, keys: &JwtKeys, kind: TokenKind) -> Result<Uuid, AppError> {
    let token = bearer_token(parts)?;
    match keys.verify_kind(token, kind) {
        Ok(claims) => Ok(claims.sub),
        Err(e) => {
            warn!(error = %e, kind = ?kind, "rejected token");
            Err(AppError::Unauthorized)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthEmployee
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        subject_of(parts, &keys, TokenKind::Employee).map(AuthEmployee)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        subject_of(parts, &keys, TokenKind::User).map(AuthUser)
    }
}
