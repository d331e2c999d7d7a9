use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{default_page, default_page_size};

#[derive(Debug, Deserialize)]
pub struct EmployeeLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct EmployeeLoginResponse {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub token: String,
}

/// Body of create and update; `id` is required for update only.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub username: String,
    pub phone: String,
    pub sex: String,
    pub id_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePageQuery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub id: Uuid,
}
