use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Combo meal sold as one item.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Setmeal {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub price: i64, // fen
    pub status: i32,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub create_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub update_time: OffsetDateTime,
    pub create_user: Option<Uuid>,
    pub update_user: Option<Uuid>,
}

/// One dish inside a setmeal; name and price are copied from the dish at save time.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SetmealDish {
    pub id: Uuid,
    pub setmeal_id: Uuid,
    pub dish_id: Uuid,
    pub name: String,
    pub price: i64,
    pub copies: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SetmealView {
    pub id: Uuid,
    pub category_id: Uuid,
    pub category_name: Option<String>,
    pub name: String,
    pub price: i64,
    pub status: i32,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub update_time: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetmealDetail {
    #[serde(flatten)]
    pub setmeal: SetmealView,
    pub setmeal_dishes: Vec<SetmealDish>,
}
