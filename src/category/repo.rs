use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{common::Audit, error::AppResult};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: i32,
    pub name: String,
    pub sort: i32,
    pub status: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub create_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub update_time: OffsetDateTime,
    pub create_user: Option<Uuid>,
    pub update_user: Option<Uuid>,
}

impl Category {
    pub async fn insert(
        db: &PgPool,
        id: Uuid,
        kind: i32,
        name: &str,
        sort: i32,
        audit: Audit,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO category
                (id, type, name, sort, status, create_time, update_time, create_user, update_user)
            VALUES ($1, $2, $3, $4, 1, $5, $5, $6, $6)
            "#,
        )
        .bind(id)
        .bind(kind)
        .bind(name)
        .bind(sort)
        .bind(audit.at)
        .bind(audit.by)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn list(db: &PgPool, kind: Option<i32>) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, type, name, sort, status, create_time, update_time, create_user, update_user
            FROM category
            WHERE ($1::int IS NULL OR type = $1) AND status = 1
            ORDER BY sort ASC, create_time DESC
            "#,
        )
        .bind(kind)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn exists(db: &PgPool, id: Uuid, kind: i32) -> AppResult<bool> {
        let (found,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM category WHERE id = $1 AND type = $2)")
                .bind(id)
                .bind(kind)
                .fetch_one(db)
                .await?;
        Ok(found)
    }
}
