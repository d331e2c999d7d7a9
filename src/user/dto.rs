use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{default_page, default_page_size};

#[derive(Debug, Deserialize)]
pub struct UserLoginRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct UserLoginResponse {
    pub id: Uuid,
    pub openid: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPageQuery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}
