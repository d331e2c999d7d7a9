use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{Dish, DishFlavor, DishView};
use crate::{
    common::{like_pattern, PageWindow},
    error::AppResult,
};

/// Optional filters of the admin dish listing.
#[derive(Debug, Default)]
pub struct DishFilter {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: Option<i32>,
}

async fn insert_flavor_tx(tx: &mut Transaction<'_, Postgres>, f: &DishFlavor) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO dish_flavor (id, dish_id, name, value)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(f.id)
    .bind(f.dish_id)
    .bind(&f.name)
    .bind(&f.value)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

impl Dish {
    /// Inserts the dish and its flavors atomically.
    pub async fn insert_with_flavors(
        db: &PgPool,
        dish: &Dish,
        flavors: &[DishFlavor],
    ) -> AppResult<()> {
        let mut tx = db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO dish
                (id, name, category_id, price, image, description, status,
                 create_time, update_time, create_user, update_user)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(dish.id)
        .bind(&dish.name)
        .bind(dish.category_id)
        .bind(dish.price)
        .bind(&dish.image)
        .bind(&dish.description)
        .bind(dish.status)
        .bind(dish.create_time)
        .bind(dish.update_time)
        .bind(dish.create_user)
        .bind(dish.update_user)
        .execute(&mut *tx)
        .await?;

        for f in flavors {
            insert_flavor_tx(&mut tx, f).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn page_query(
        db: &PgPool,
        filter: &DishFilter,
        window: PageWindow,
    ) -> AppResult<(i64, Vec<DishView>)> {
        let pattern = filter.name.as_deref().map(like_pattern);
        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM dish d
            WHERE ($1::text IS NULL OR d.name LIKE $1 ESCAPE '\')
              AND ($2::uuid IS NULL OR d.category_id = $2)
              AND ($3::int IS NULL OR d.status = $3)
            "#,
        )
        .bind(pattern.as_deref())
        .bind(filter.category_id)
        .bind(filter.status)
        .fetch_one(db)
        .await?;

        let rows = sqlx::query_as::<_, DishView>(
            r#"
            SELECT d.id, d.name, d.category_id, c.name AS category_name, d.price,
                   d.image, d.description, d.status, d.update_time
            FROM dish d
            LEFT JOIN category c ON c.id = d.category_id
            WHERE ($1::text IS NULL OR d.name LIKE $1 ESCAPE '\')
              AND ($2::uuid IS NULL OR d.category_id = $2)
              AND ($3::int IS NULL OR d.status = $3)
            ORDER BY d.update_time DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(pattern.as_deref())
        .bind(filter.category_id)
        .bind(filter.status)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(db)
        .await?;

        Ok((total, rows))
    }

    pub async fn find_by_ids(db: &PgPool, ids: &[Uuid]) -> AppResult<Vec<Dish>> {
        let rows = sqlx::query_as::<_, Dish>(
            r#"
            SELECT id, name, category_id, price, image, description, status,
                   create_time, update_time, create_user, update_user
            FROM dish
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
