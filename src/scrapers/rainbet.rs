//! Rainbet affiliate API client
//!
//! One GET per window; the API only understands whole days, so the window is sent as
//! `YYYY-MM-DD` dates.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::AffiliateSource;
use crate::error::UpstreamError;
use crate::models::{RawEntry, TimeWindow};

pub const RAINBET_API_URL: &str = "https://services.rainbet.com/v1/external/affiliates";

const ENDPOINT: &str = "rainbet affiliates";

#[derive(Clone)]
pub struct RainbetClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct AffiliatesResponse {
    #[serde(default)]
    affiliates: Option<Vec<RawEntry>>,
}

impl RainbetClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl AffiliateSource for RainbetClient {
    async fn fetch_window(&self, window: &TimeWindow) -> Result<Vec<RawEntry>, UpstreamError> {
        let start = window.start_ymd();
        let end = window.end_ymd();
        let qp = [
            ("start_at", start.as_str()),
            ("end_at", end.as_str()),
            ("key", self.api_key.as_str()),
        ];

        let resp = self
            .client
            .get(&self.base_url)
            .query(&qp)
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

        let text = resp.text().await.map_err(|source| UpstreamError::Transport {
            endpoint: ENDPOINT,
            source,
        })?;
        let parsed: AffiliatesResponse =
            serde_json::from_str(&text).map_err(|e| UpstreamError::Shape {
                endpoint: ENDPOINT,
                detail: e.to_string(),
            })?;

        let affiliates = parsed.affiliates.ok_or_else(|| UpstreamError::Shape {
            endpoint: ENDPOINT,
            detail: "missing `affiliates`".to_string(),
        })?;

        debug!(start = %start, end = %end, rows = affiliates.len(), "Fetched affiliate totals");
        Ok(affiliates)
    }
}
