use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::dto::Code2SessionResponse;
use crate::{config::WeChatConfig, error::AppError};

#[derive(Debug, thiserror::Error)]
pub enum WeChatError {
    /// Network error, timeout or unreadable body.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("no openid in response (errcode={errcode:?}, errmsg={errmsg:?})")]
    MissingOpenid {
        errcode: Option<i64>,
        errmsg: Option<String>,
    },
}

/// Resolves a client-side login code into a stable external identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Every provider-side failure comes back as [`AppError::LoginFailed`].
    async fn resolve_openid(&self, code: &str) -> Result<String, AppError>;
}

#[derive(Debug, Clone)]
pub struct WeChatClient {
    config: WeChatConfig,
    http: reqwest::Client,
}

impl WeChatClient {
    pub fn new(config: WeChatConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sky-takeout/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;
        Ok(Self { config, http })
    }

    /// Calls `jscode2session`. The HTTP status is not consulted; only the body decides.
    #[instrument(skip(self, code), fields(appid = %self.config.appid))]
    pub async fn code2session(&self, code: &str) -> Result<Code2SessionResponse, WeChatError> {
        debug!("exchanging login code with wechat");

        let response = self
            .http
            .get(&self.config.login_url)
            .query(&[
                ("appid", self.config.appid.as_str()),
                ("secret", self.config.secret.as_str()),
                ("js_code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let status = response.status();
        // WeChat labels the body text/plain, so go through text rather than .json()
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| WeChatError::Parse(format!("status {status}: {e}")))
    }

    pub async fn exchange_openid(&self, code: &str) -> Result<String, WeChatError> {
        let resp = self.code2session(code).await?;
        debug!(has_unionid = resp.unionid.is_some(), "code2session answered");
        let errcode = resp.errcode;
        let errmsg = resp.errmsg.clone();
        resp.into_openid()
            .ok_or(WeChatError::MissingOpenid { errcode, errmsg })
    }
}

#[async_trait]
impl IdentityProvider for WeChatClient {
    async fn resolve_openid(&self, code: &str) -> Result<String, AppError> {
        self.exchange_openid(code).await.map_err(|e| {
            warn!(error = %e, "wechat login failed");
            AppError::LoginFailed
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const LOGIN_PATH: &str = "/sns/jscode2session";

    fn client_for(server: &MockServer, timeout_secs: u64) -> WeChatClient {
        WeChatClient::new(WeChatConfig {
            appid: "wx-app".into(),
            secret: "wx-secret".into(),
            login_url: format!("{}{}", server.uri(), LOGIN_PATH),
            timeout_secs,
        })
        .expect("client builds")
    }

    #[tokio::test]
    async fn resolves_openid_and_sends_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LOGIN_PATH))
            .and(query_param("appid", "wx-app"))
            .and(query_param("secret", "wx-secret"))
            .and(query_param("js_code", "abc123"))
            .and(query_param("grant_type", "authorization_code"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(
                    json!({"openid": "wx-001", "session_key": "sk", "unionid": "u-1"}),
                ),
            )
            .expect(1)
            .mount(&server)
            .await;

        let openid = client_for(&server, 5).resolve_openid("abc123").await.unwrap();
        assert_eq!(openid, "wx-001");
    }

    #[tokio::test]
    async fn errcode_without_openid_is_login_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LOGIN_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"errcode": 40029, "errmsg": "invalid code"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, 5);
        match client.exchange_openid("bad").await {
            Err(WeChatError::MissingOpenid { errcode, .. }) => assert_eq!(errcode, Some(40029)),
            other => panic!("unexpected: {other:?}"),
        }
        let err = client.resolve_openid("bad").await.unwrap_err();
        assert!(matches!(err, AppError::LoginFailed));
    }

    #[tokio::test]
    async fn http_status_is_ignored_in_favour_of_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({"errcode": -1})))
            .mount(&server)
            .await;

        let err = client_for(&server, 5).resolve_openid("abc").await.unwrap_err();
        assert!(matches!(err, AppError::LoginFailed));
    }

    #[tokio::test]
    async fn non_json_body_is_login_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, 5);
        assert!(matches!(
            client.exchange_openid("abc").await,
            Err(WeChatError::Parse(_))
        ));
        assert!(matches!(
            client.resolve_openid("abc").await,
            Err(AppError::LoginFailed)
        ));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LOGIN_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"openid": "wx-late"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, 1);
        assert!(matches!(
            client.exchange_openid("abc").await,
            Err(WeChatError::Http(_))
        ));
    }
}
