use serde::Deserialize;
use uuid::Uuid;

use crate::common::{default_page, default_page_size, STATUS_ENABLED};

fn default_status() -> i32 {
    STATUS_ENABLED
}

#[derive(Debug, Clone, Deserialize)]
pub struct DishFlavorDto {
    pub name: String,
    pub value: String, // JSON list of options, e.g. ["mild","hot"]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishDto {
    pub name: String,
    pub category_id: Uuid,
    pub price: i64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: i32,
    #[serde(default)]
    pub flavors: Vec<DishFlavorDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishPageQuery {
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
