use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Customer account provisioned from a WeChat login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub openid: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub create_time: OffsetDateTime,
}

/// Row to insert on first login; profile fields start empty.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub openid: String,
    pub create_time: OffsetDateTime,
}

impl NewUser {
    pub fn for_openid(openid: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            openid: openid.into(),
            create_time: OffsetDateTime::now_utc(),
        }
    }
}

impl From<NewUser> for User {
    fn from(n: NewUser) -> Self {
        Self {
            id: n.id,
            openid: n.openid,
            name: None,
            phone: None,
            avatar: None,
            create_time: n.create_time,
        }
    }
}
