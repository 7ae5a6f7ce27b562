//! Fetch-and-build operations behind the routes and the refresh poller.

use chrono::{DateTime, Utc};

use crate::error::{LeaderboardError, UpstreamError};
use crate::leaderboard::builder::{build, Rounding};
use crate::leaderboard::cache::LeaderboardCache;
use crate::leaderboard::period::period_bounds_at;
use crate::models::{LeaderboardEntry, RawEntry, RawRecord, TimeWindow};
use crate::scrapers::xfun::record_username;
use crate::scrapers::{fetch_all, AffiliateSource, Metric, PageSource};
use crate::state::BiweeklySettings;

/// Wager board for a single billing window, rounded to whole units.
pub async fn cycle_leaderboard(
    source: &dyn AffiliateSource,
    window: &TimeWindow,
) -> Result<Vec<LeaderboardEntry>, UpstreamError> {
    let rows = source.fetch_window(window).await?;
    Ok(build(
        &rows,
        |r: &RawEntry| r.username.clone().unwrap_or_default(),
        RawEntry::wagered,
        Rounding::Whole,
    ))
}

/// Board for the cycle `offset` cycles away from the one running at `now`.
pub async fn leaderboard_for_offset(
    source: &dyn AffiliateSource,
    now: DateTime<Utc>,
    offset: i32,
) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
    let window = period_bounds_at(now, offset)?;
    Ok(cycle_leaderboard(source, &window).await?)
}

/// Rebuild the running cycle's board and publish it. The cache is untouched on failure.
pub async fn refresh_current(
    source: &dyn AffiliateSource,
    cache: &LeaderboardCache,
    now: DateTime<Utc>,
) -> Result<usize, LeaderboardError> {
    let entries = leaderboard_for_offset(source, now, 0).await?;
    let count = entries.len();
    cache.publish(entries, now);
    Ok(count)
}

/// Every raw record in the configured biweekly window.
pub async fn biweekly_records(
    source: &dyn PageSource,
    settings: &BiweeklySettings,
) -> Result<Vec<RawRecord>, UpstreamError> {
    fetch_all(source, &settings.window, settings.page_size, settings.max_pages).await
}

/// Deposit board for the biweekly window, rounded to cents.
pub async fn biweekly_leaderboard(
    source: &dyn PageSource,
    settings: &BiweeklySettings,
) -> Result<Vec<LeaderboardEntry>, UpstreamError> {
    let records = biweekly_records(source, settings).await?;
    Ok(build(
        &records,
        record_username,
        |r| Metric::Deposited.read(r),
        Rounding::Cents,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Amount, LooseNumber};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeAffiliates {
        rows: Option<Vec<RawEntry>>,
        seen: Mutex<Vec<TimeWindow>>,
    }

    impl FakeAffiliates {
        fn ok(rows: &[(&str, &str)]) -> Self {
            Self {
                rows: Some(
                    rows.iter()
                        .map(|(u, w)| RawEntry {
                            username: Some(u.to_string()),
                            wagered_amount: Some(LooseNumber::Text(w.to_string())),
                        })
                        .collect(),
                ),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                rows: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AffiliateSource for FakeAffiliates {
        async fn fetch_window(&self, window: &TimeWindow) -> Result<Vec<RawEntry>, UpstreamError> {
            self.seen.lock().unwrap().push(*window);
            self.rows.clone().ok_or(UpstreamError::Shape {
                endpoint: "fake",
                detail: "missing `affiliates`".to_string(),
            })
        }
    }

    struct OnePage(Vec<RawRecord>);

    #[async_trait]
    impl PageSource for OnePage {
        async fn fetch_page(
            &self,
            _window: &TimeWindow,
            _take: u32,
            skip: u32,
        ) -> Result<Vec<RawRecord>, UpstreamError> {
            Ok(if skip == 0 { self.0.clone() } else { Vec::new() })
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 17, 9, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn test_cycle_board_rounds_to_whole_units() {
        let source = FakeAffiliates::ok(&[
            ("alice_w", "100.4"),
            ("bob_the", "250.5"),
            ("carl", "75"),
        ]);
        let board = leaderboard_for_offset(&source, now(), 0).await.unwrap();

        assert_eq!(board[0].username, "al***_w");
        assert_eq!(board[0].wagered, Amount::Whole(100));
        assert_eq!(board[1].username, "bo***he");
        assert_eq!(board[1].wagered, Amount::Whole(251));
        assert_eq!(board[2].username, "carl");

        let seen = source.seen.lock().unwrap();
        assert_eq!(seen[0].start_ymd(), "2025-08-05");
        assert_eq!(seen[0].end_ymd(), "2025-09-04");
    }

    #[tokio::test]
    async fn test_previous_offset_window() {
        let source = FakeAffiliates::ok(&[]);
        leaderboard_for_offset(&source, now(), -1).await.unwrap();
        let seen = source.seen.lock().unwrap();
        assert_eq!(seen[0].start_ymd(), "2025-07-05");
        assert_eq!(seen[0].end_ymd(), "2025-08-04");
    }

    #[tokio::test]
    async fn test_refresh_publishes_on_success() {
        let cache = LeaderboardCache::new();
        let source = FakeAffiliates::ok(&[("alice_w", "10"), ("bob_the", "20")]);

        let count = refresh_current(&source, &cache, now()).await.unwrap();
        assert_eq!(count, 2);
        let snap = cache.snapshot();
        assert_eq!(snap.entries.len(), 2);
        assert_eq!(snap.refreshed_at, Some(now()));
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_board() {
        let cache = LeaderboardCache::new();
        let good = FakeAffiliates::ok(&[("alice_w", "10")]);
        refresh_current(&good, &cache, now()).await.unwrap();

        let bad = FakeAffiliates::failing();
        let err = refresh_current(&bad, &cache, now()).await.unwrap_err();
        assert!(matches!(
            err,
            LeaderboardError::Upstream(UpstreamError::Shape { .. })
        ));
        assert_eq!(cache.snapshot().entries.len(), 1);
    }

    #[tokio::test]
    async fn test_biweekly_board_sums_deposits() {
        let source = OnePage(vec![
            json!({"name": "depositor1", "deposited": 10.25}),
            json!({"username": "depositor2", "deposited": "5"}),
            json!({"name": "depositor1", "deposited": "4.75", "wagered": 999}),
            json!({"deposited": 1}),
            json!({"wagered": 50}),
        ]);
        let settings = BiweeklySettings {
            window: TimeWindow::new(
                Utc.with_ymd_and_hms(2025, 8, 11, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 8, 25, 0, 0, 0).unwrap(),
            )
            .unwrap(),
            page_size: 50,
            max_pages: 200,
        };

        let board = biweekly_leaderboard(&source, &settings).await.unwrap();
        // depositor1 15, depositor2 5, Unknown 1 (two nameless rows share one group).
        assert_eq!(board.len(), 3);
        assert_eq!(board[0].username, "de***r2");
        assert_eq!(board[1].username, "de***r1");
        assert_eq!(board[1].wagered, Amount::Cents(15.0));
        assert_eq!(board[2].username, "Un***wn");
        assert_eq!(board[2].weighted_wager, Amount::Cents(1.0));
    }
}
