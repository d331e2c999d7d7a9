use serde::Deserialize;

/// Body returned by `jscode2session`.
///
/// On success it carries `openid` (plus `session_key`, which is ignored);
/// on failure only `errcode`/`errmsg`. WeChat often answers HTTP 200 either way.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Code2SessionResponse {
    #[serde(default)]
    pub openid: Option<String>,
    #[serde(default)]
    pub unionid: Option<String>,
    #[serde(default)]
    pub errcode: Option<i64>,
    #[serde(default)]
    pub errmsg: Option<String>,
}

impl Code2SessionResponse {
    pub fn into_openid(self) -> Option<String> {
        self.openid.filter(|o| !o.trim().is_empty())
    }
}
