use serde::Deserialize;
use uuid::Uuid;

use crate::common::{default_page, default_page_size, STATUS_DISABLED};

fn default_status() -> i32 {
    STATUS_DISABLED
}

fn default_copies() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetmealDishDto {
    pub dish_id: Uuid,
    #[serde(default = "default_copies")]
    pub copies: i32,
}

/// New setmeals start off sale unless the request says otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetmealDto {
    pub category_id: Uuid,
    pub name: String,
    pub price: i64,
    #[serde(default = "default_status")]
    pub status: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub setmeal_dishes: Vec<SetmealDishDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetmealPageQuery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

/// `?ids=<uuid>,<uuid>`
#[derive(Debug, Deserialize)]
pub struct IdsQuery {
    pub ids: String,
}
