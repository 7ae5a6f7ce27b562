use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure talking to one of the affiliate APIs.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {endpoint}: {detail}")]
    Shape {
        endpoint: &'static str,
        detail: String,
    },

    #[error("pagination aborted at page {page}: {source}")]
    PaginationAbort {
        page: u32,
        #[source]
        source: Box<UpstreamError>,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("window start {start} is not before end {end}")]
pub struct InvalidWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("billing cycle {year}-{month:02} is outside the supported calendar range")]
    OutOfRange { year: i32, month: u32 },

    #[error(transparent)]
    InvalidWindow(#[from] InvalidWindow),
}

/// Anything that can go wrong while producing a leaderboard on demand.
#[derive(Error, Debug)]
pub enum LeaderboardError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Period(#[from] PeriodError),
}
