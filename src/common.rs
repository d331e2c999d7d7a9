use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub const STATUS_ENABLED: i32 = 1;
pub const STATUS_DISABLED: i32 = 0;

const MAX_PAGE_SIZE: i64 = 100;

/// Response envelope shared by every endpoint: `code` is 1 on success, 0 on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 1,
            msg: None,
            data: Some(data),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            code: 0,
            msg: Some(msg.into()),
            data: None,
        }
    }
}

impl ApiResult<()> {
    pub fn ok() -> Self {
        Self {
            code: 1,
            msg: None,
            data: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageResult<T> {
    pub total: i64,
    pub records: Vec<T>,
}

pub fn default_page() -> i64 {
    1
}

pub fn default_page_size() -> i64 {
    10
}

/// LIMIT/OFFSET pair derived from a 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    pub fn new(page: i64, page_size: i64) -> Self {
        let page = page.max(1);
        let limit = page_size.clamp(1, MAX_PAGE_SIZE);
        Self {
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }
}

/// Audit columns stamped on admin-managed rows.
#[derive(Debug, Clone, Copy)]
pub struct Audit {
    pub at: OffsetDateTime,
    pub by: Uuid,
}

impl Audit {
    pub fn now(by: Uuid) -> Self {
        Self {
            at: OffsetDateTime::now_utc(),
            by,
        }
    }
}

/// Turns empty or whitespace-only filters into `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `%fragment%` for a `LIKE ... ESCAPE '\'` filter, with `\`, `%` and `_` matched literally.
pub fn like_pattern(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 2);
    out.push('%');
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_from_first_page() {
        assert_eq!(PageWindow::new(1, 10), PageWindow { limit: 10, offset: 0 });
        assert_eq!(PageWindow::new(3, 20), PageWindow { limit: 20, offset: 40 });
    }

    #[test]
    fn page_window_clamps_bad_input() {
        assert_eq!(PageWindow::new(0, 10), PageWindow { limit: 10, offset: 0 });
        assert_eq!(PageWindow::new(-5, 0), PageWindow { limit: 1, offset: 0 });
        assert_eq!(PageWindow::new(2, 10_000).limit, 100);
    }

    #[test]
    fn api_result_shapes() {
        let ok = serde_json::to_value(ApiResult::success(5)).unwrap();
        assert_eq!(ok, serde_json::json!({"code": 1, "data": 5}));

        let err = serde_json::to_value(ApiResult::<()>::error("nope")).unwrap();
        assert_eq!(err, serde_json::json!({"code": 0, "msg": "nope"}));
    }

    #[test]
    fn non_blank_drops_whitespace() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" fish ".into())), Some("fish".into()));
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("fish"), "%fish%");
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }
}
