use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::repo_types::{NewUser, User};
use crate::{
    common::{like_pattern, PageWindow},
    error::AppError,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another row already holds this openid (UNIQUE index hit).
    #[error("user with this openid already exists")]
    Conflict,

    #[error("user store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict => AppError::AlreadyExists("user".into()),
            StoreError::Unavailable(e) => AppError::PersistenceUnavailable(e),
        }
    }
}

/// Persistence port for customer accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_openid(&self, openid: &str) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the openid is taken.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Newest first, optionally narrowed to names containing `name`; returns the filtered total too.
    async fn page(
        &self,
        name: Option<&str>,
        window: PageWindow,
    ) -> Result<(i64, Vec<User>), StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self, openid))]
    async fn find_by_openid(&self, openid: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, openid, name, phone, avatar, create_time
            FROM users
            WHERE openid = $1
            "#,
        )
        .bind(openid)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, openid, create_time)
            VALUES ($1, $2, $3)
            RETURNING id, openid, name, phone, avatar, create_time
            "#,
        )
        .bind(user.id)
        .bind(&user.openid)
        .bind(user.create_time)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict
            }
            _ => StoreError::Unavailable(e),
        })
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, openid, name, phone, avatar, create_time
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn page(
        &self,
        name: Option<&str>,
        window: PageWindow,
    ) -> Result<(i64, Vec<User>), StoreError> {
        let pattern = name.map(like_pattern);
        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE ($1::text IS NULL OR name LIKE $1 ESCAPE '\')
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, openid, name, phone, avatar, create_time
            FROM users
            WHERE ($1::text IS NULL OR name LIKE $1 ESCAPE '\')
            ORDER BY create_time DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern.as_deref())
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.db)
        .await?;

        Ok((total, rows))
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;
        Ok(total)
    }
}
