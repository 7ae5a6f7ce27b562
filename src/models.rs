use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::InvalidWindow;

/// Half-open reporting window. Both bounds are whole-second UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidWindow> {
        if start >= end {
            return Err(InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Start as a calendar date (`YYYY-MM-DD`). The time of day is dropped.
    pub fn start_ymd(&self) -> String {
        ymd(self.start)
    }

    pub fn end_ymd(&self) -> String {
        ymd(self.end)
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

/// Render a UTC instant as a day-granularity date string.
pub fn ymd(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn iso_millis(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Numeric field that upstream sends either as a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    /// Parsed value; anything unparseable or non-finite counts as zero.
    ///
    /// Text is read up to the longest numeric prefix, so `"123.5 USD"` is `123.5`.
    pub fn value(&self) -> f64 {
        let v = match self {
            LooseNumber::Number(n) => *n,
            LooseNumber::Text(s) => {
                let s = s.trim_start();
                s[..numeric_prefix_len(s)].parse::<f64>().unwrap_or(0.0)
            }
        };
        if v.is_finite() {
            v
        } else {
            0.0
        }
    }
}

/// Byte length of the leading `[+-]digits[.digits][(e|E)[+-]digits]` run of `s`.
fn numeric_prefix_len(s: &str) -> usize {
    let b = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        i = 1;
    }
    let int_end = digits_from(i);
    let mut end = int_end;
    let mut seen_digit = int_end > i;

    if b.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if seen_digit || frac_end > end + 1 {
            seen_digit |= frac_end > end + 1;
            end = frac_end;
        }
    }
    if !seen_digit {
        return 0;
    }

    if matches!(b.get(end), Some(b'e' | b'E')) {
        let mut j = end + 1;
        if matches!(b.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_end = digits_from(j);
        if exp_end > j {
            end = exp_end;
        }
    }
    end
}

/// One row of the date-range affiliate API (`affiliates[]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub wagered_amount: Option<LooseNumber>,
}

impl RawEntry {
    pub fn wagered(&self) -> f64 {
        self.wagered_amount.as_ref().map(LooseNumber::value).unwrap_or(0.0)
    }
}

/// Heterogeneous per-bet/per-deposit record from the paginated API. Kept as raw JSON so
/// `/raw` can return it untouched; fields are resolved through `scrapers::xfun` accessors.
pub type RawRecord = serde_json::Value;

/// Displayed total. Whole amounts serialize as JSON integers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    Whole(i64),
    Cents(f64),
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Amount::Whole(v) => serializer.serialize_i64(v),
            Amount::Cents(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => {
                serializer.serialize_i64(v as i64)
            }
            Amount::Cents(v) => serializer.serialize_f64(v),
        }
    }
}

/// Public leaderboard row. `weighted_wager` always equals `wagered`; the field is kept for
/// frontend compatibility.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: String,
    pub wagered: Amount,
    pub weighted_wager: Amount,
}

/// Window bounds as rendered by the `/period` debug route.
#[derive(Debug, Clone, Serialize)]
pub struct WindowView {
    #[serde(rename = "startISO")]
    pub start_iso: String,
    #[serde(rename = "endISO")]
    pub end_iso: String,
    #[serde(rename = "startYMD")]
    pub start_ymd: String,
    #[serde(rename = "endYMD")]
    pub end_ymd: String,
}

impl From<&TimeWindow> for WindowView {
    fn from(w: &TimeWindow) -> Self {
        Self {
            start_iso: iso_millis(w.start()),
            end_iso: iso_millis(w.end()),
            start_ymd: w.start_ymd(),
            end_ymd: w.end_ymd(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodOverview {
    pub current: WindowView,
    pub previous: WindowView,
    pub next: WindowView,
}
