use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub price: i64, // fen
    pub image: Option<String>,
    pub description: Option<String>,
    pub status: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub create_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub update_time: OffsetDateTime,
    pub create_user: Option<Uuid>,
    pub update_user: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DishFlavor {
    pub id: Uuid,
    pub dish_id: Uuid,
    pub name: String,
    pub value: String,
}

/// Row of the admin dish listing, joined with its category name.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DishView {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub category_name: Option<String>,
    pub price: i64,
    pub image: Option<String>,
    pub description: Option<String>,
    pub status: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub update_time: OffsetDateTime,
}
