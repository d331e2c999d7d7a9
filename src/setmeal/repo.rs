use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{Setmeal, SetmealDish, SetmealView};
use crate::{
    common::{like_pattern, PageWindow},
    error::AppResult,
};

#[derive(Debug, Default)]
pub struct SetmealFilter {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: Option<i32>,
}

const VIEW_SELECT: &str = "SELECT s.id, s.category_id, c.name AS category_name, s.name, s.price, \
                           s.status, s.description, s.image, s.update_time \
                           FROM setmeal s LEFT JOIN category c ON c.id = s.category_id";

async fn insert_dish_tx(tx: &mut Transaction<'_, Postgres>, d: &SetmealDish) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO setmeal_dish (id, setmeal_id, dish_id, name, price, copies)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(d.id)
    .bind(d.setmeal_id)
    .bind(d.dish_id)
    .bind(&d.name)
    .bind(d.price)
    .bind(d.copies)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

impl Setmeal {
    pub async fn insert_with_dishes(
        db: &PgPool,
        setmeal: &Setmeal,
        dishes: &[SetmealDish],
    ) -> AppResult<()> {
        let mut tx = db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO setmeal
                (id, category_id, name, price, status, description, image,
                 create_time, update_time, create_user, update_user)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(setmeal.id)
        .bind(setmeal.category_id)
        .bind(&setmeal.name)
        .bind(setmeal.price)
        .bind(setmeal.status)
        .bind(&setmeal.description)
        .bind(&setmeal.image)
        .bind(setmeal.create_time)
        .bind(setmeal.update_time)
        .bind(setmeal.create_user)
        .bind(setmeal.update_user)
        .execute(&mut *tx)
        .await?;

        for d in dishes {
            insert_dish_tx(&mut tx, d).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn page_query(
        db: &PgPool,
        filter: &SetmealFilter,
        window: PageWindow,
    ) -> AppResult<(i64, Vec<SetmealView>)> {
        let pattern = filter.name.as_deref().map(like_pattern);
        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM setmeal s
            WHERE ($1::text IS NULL OR s.name LIKE $1 ESCAPE '\')
              AND ($2::uuid IS NULL OR s.category_id = $2)
              AND ($3::int IS NULL OR s.status = $3)
            "#,
        )
        .bind(pattern.as_deref())
        .bind(filter.category_id)
        .bind(filter.status)
        .fetch_one(db)
        .await?;

        let sql = format!(
            "{VIEW_SELECT} \
             WHERE ($1::text IS NULL OR s.name LIKE $1 ESCAPE '\\') \
               AND ($2::uuid IS NULL OR s.category_id = $2) \
               AND ($3::int IS NULL OR s.status = $3) \
             ORDER BY s.update_time DESC \
             LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, SetmealView>(&sql)
            .bind(pattern.as_deref())
            .bind(filter.category_id)
            .bind(filter.status)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(db)
            .await?;

        Ok((total, rows))
    }

    pub async fn get_view(db: &PgPool, id: Uuid) -> AppResult<Option<SetmealView>> {
        let sql = format!("{VIEW_SELECT} WHERE s.id = $1");
        let row = sqlx::query_as::<_, SetmealView>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    pub async fn dishes_of(db: &PgPool, setmeal_id: Uuid) -> AppResult<Vec<SetmealDish>> {
        let rows = sqlx::query_as::<_, SetmealDish>(
            r#"
            SELECT id, setmeal_id, dish_id, name, price, copies
            FROM setmeal_dish
            WHERE setmeal_id = $1
            ORDER BY name
            "#,
        )
        .bind(setmeal_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Locks the rows and hands back `(id, status)` so the caller can veto the delete,
    /// then removes links and setmeals in the same transaction.
    pub async fn delete_batch<F>(db: &PgPool, ids: &[Uuid], check: F) -> AppResult<u64>
    where
        F: FnOnce(&[(Uuid, i32)]) -> AppResult<()>,
    {
        let mut tx = db.begin().await?;

        let rows: Vec<(Uuid, i32)> =
            sqlx::query_as("SELECT id, status FROM setmeal WHERE id = ANY($1) FOR UPDATE")
                .bind(ids)
                .fetch_all(&mut *tx)
                .await?;
        check(&rows)?;

        sqlx::query("DELETE FROM setmeal_dish WHERE setmeal_id = ANY($1)")
            .bind(ids)
            .execute(&mut *tx)
            .await?;
        let done = sqlx::query("DELETE FROM setmeal WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(done.rows_affected())
    }
}
