//! x.fun affiliate API client
//!
//! Records are paged with `take`/`skip` between two millisecond timestamps. Row shapes vary
//! between record kinds, so fields are resolved through ordered fallback keys instead of a
//! fixed struct.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::Value;

use super::PageSource;
use crate::error::UpstreamError;
use crate::models::{RawRecord, TimeWindow};

pub const XFUN_API_URL: &str = "https://api.x.fun/api/affiliate/external";

const ENDPOINT: &str = "x.fun affiliate";

/// Group key for rows that carry no usable name.
pub const UNKNOWN_USER: &str = "Unknown";

/// Key paths tried in order for the display name.
const USERNAME_PATHS: &[&[&str]] = &[
    &["name"],
    &["username"],
    &["userName"],
    &["user", "username"],
    &["user"],
];

const WAGER_KEYS: &[&str] = &["wagered", "betAmount", "amount", "stake", "value"];
const DEPOSIT_KEYS: &[&str] = &["deposited"];

#[derive(Clone)]
pub struct XfunClient {
    client: Client,
    base_url: String,
    code: String,
    api_key: String,
}

impl XfunClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        code: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            code: code.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl PageSource for XfunClient {
    async fn fetch_page(
        &self,
        window: &TimeWindow,
        take: u32,
        skip: u32,
    ) -> Result<Vec<RawRecord>, UpstreamError> {
        let qp: [(&str, String); 5] = [
            ("code", self.code.clone()),
            ("gt", window.start_ms().to_string()),
            ("lt", window.end_ms().to_string()),
            ("take", take.to_string()),
            ("skip", skip.to_string()),
        ];

        let resp = self
            .client
            .get(&self.base_url)
            .query(&qp)
            .header("x-apikey", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                endpoint: ENDPOINT,
                source,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                endpoint: ENDPOINT,
                status,
                body,
            });
        }

        let body = resp
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::Shape {
                endpoint: ENDPOINT,
                detail: e.to_string(),
            })?;

        Ok(page_records(body))
    }
}

/// A page is either a bare array or `{ "data": [...] }`; anything else is an empty page.
pub fn page_records(body: Value) -> Vec<RawRecord> {
    match body {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn lookup<'a>(record: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(record, |v, key| v.get(key))
        .filter(|v| !v.is_null())
}

/// Display name of a row: first string or numeric value along [`USERNAME_PATHS`].
pub fn record_username(record: &Value) -> String {
    USERNAME_PATHS
        .iter()
        .find_map(|path| match lookup(record, path)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}

/// Which amount a board ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Bet volume; the wager-mode selector for paged records. The biweekly board ranks deposits.
    Wagered,
    Deposited,
}

impl Metric {
    fn keys(self) -> &'static [&'static str] {
        match self {
            Metric::Wagered => WAGER_KEYS,
            Metric::Deposited => DEPOSIT_KEYS,
        }
    }

    /// The first present key decides; a present but non-numeric value reads as 0.
    pub fn read(self, record: &Value) -> f64 {
        self.keys()
            .iter()
            .find_map(|key| lookup(record, &[*key]))
            .map(numeric)
            .unwrap_or(0.0)
    }
}

fn numeric(v: &Value) -> f64 {
    let n = match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_username_fallback_order() {
        assert_eq!(record_username(&json!({"name": "n", "username": "u"})), "n");
        assert_eq!(record_username(&json!({"name": null, "username": "u"})), "u");
        assert_eq!(record_username(&json!({"userName": "camel"})), "camel");
        assert_eq!(
            record_username(&json!({"user": {"username": "nested"}})),
            "nested"
        );
        assert_eq!(record_username(&json!({"user": "flat"})), "flat");
        assert_eq!(record_username(&json!({"user": 42})), "42");
    }

    #[test]
    fn test_username_defaults_to_unknown() {
        assert_eq!(record_username(&json!({})), UNKNOWN_USER);
        assert_eq!(record_username(&json!({"user": {"id": 7}})), UNKNOWN_USER);
        assert_eq!(record_username(&json!("not an object")), UNKNOWN_USER);
    }

    #[test]
    fn test_wager_fallback_order() {
        assert_eq!(Metric::Wagered.read(&json!({"wagered": 5, "amount": 9})), 5.0);
        assert_eq!(Metric::Wagered.read(&json!({"betAmount": "2.5"})), 2.5);
        assert_eq!(Metric::Wagered.read(&json!({"stake": 3})), 3.0);
        assert_eq!(Metric::Wagered.read(&json!({"value": 1.5})), 1.5);
        assert_eq!(Metric::Wagered.read(&json!({})), 0.0);
        // First present key wins even when it is garbage.
        assert_eq!(Metric::Wagered.read(&json!({"wagered": "abc", "amount": 9})), 0.0);
    }

    #[test]
    fn test_deposit_reads_only_deposited() {
        assert_eq!(Metric::Deposited.read(&json!({"deposited": "12.34"})), 12.34);
        assert_eq!(Metric::Deposited.read(&json!({"wagered": 100})), 0.0);
    }

    #[test]
    fn test_page_shapes() {
        assert_eq!(page_records(json!([{"a": 1}, {"a": 2}])).len(), 2);
        assert_eq!(page_records(json!({"data": [{"a": 1}]})).len(), 1);
        assert!(page_records(json!({"items": [1, 2]})).is_empty());
        assert!(page_records(json!({"data": "nope"})).is_empty());
        assert!(page_records(json!(null)).is_empty());
    }
}
