use std::fmt;
use std::time::Duration;

use serde::Deserialize;

pub const WECHAT_LOGIN_URL: &str = "https://api.weixin.qq.com/sns/jscode2session";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Credentials of the mini-program registered with WeChat.
#[derive(Clone, Deserialize)]
pub struct WeChatConfig {
    pub appid: String,
    pub secret: String,
    pub login_url: String,
    pub timeout_secs: u64,
}

impl WeChatConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for WeChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeChatConfig")
            .field("appid", &self.appid)
            .field("secret", &"[REDACTED]")
            .field("login_url", &self.login_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub wechat: WeChatConfig,
    pub request_timeout_secs: u64,
    pub admin_bootstrap_password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "sky-takeout".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "sky-takeout-clients".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 120),
        };
        let wechat = WeChatConfig {
            appid: std::env::var("WECHAT_APPID")?,
            secret: std::env::var("WECHAT_SECRET")?,
            login_url: std::env::var("WECHAT_LOGIN_URL")
                .unwrap_or_else(|_| WECHAT_LOGIN_URL.into()),
            timeout_secs: env_parse("WECHAT_TIMEOUT_SECS", 5),
        };
        if wechat.appid.is_empty() || wechat.secret.is_empty() {
            anyhow::bail!("WECHAT_APPID and WECHAT_SECRET must not be empty");
        }
        Ok(Self {
            database_url,
            jwt,
            wechat,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 10),
            admin_bootstrap_password: std::env::var("ADMIN_BOOTSTRAP_PASSWORD")
                .ok()
                .filter(|v| !v.is_empty()),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
