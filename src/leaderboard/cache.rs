//! Published leaderboard for the running cycle.
//!
//! A single writer (the refresh poller) builds a complete board and swaps it in; readers
//! load whichever snapshot is current without locking.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};

use crate::models::LeaderboardEntry;

#[derive(Debug, Clone, Default)]
pub struct LeaderboardSnapshot {
    pub entries: Vec<LeaderboardEntry>,
    /// `None` until the first successful refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct LeaderboardCache {
    current: ArcSwap<LeaderboardSnapshot>,
}

impl LeaderboardCache {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(LeaderboardSnapshot::default()),
        }
    }

    pub fn snapshot(&self) -> Arc<LeaderboardSnapshot> {
        self.current.load_full()
    }

    /// Replace the whole board in one store.
    pub fn publish(&self, entries: Vec<LeaderboardEntry>, refreshed_at: DateTime<Utc>) {
        self.current.store(Arc::new(LeaderboardSnapshot {
            entries,
            refreshed_at: Some(refreshed_at),
        }));
    }
}

impl Default for LeaderboardCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Amount;

    fn entry(name: &str, v: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            username: name.to_string(),
            wagered: Amount::Whole(v),
            weighted_wager: Amount::Whole(v),
        }
    }

    #[test]
    fn test_starts_empty() {
        let cache = LeaderboardCache::new();
        let snap = cache.snapshot();
        assert!(snap.entries.is_empty());
        assert!(snap.refreshed_at.is_none());
    }

    #[test]
    fn test_publish_replaces_whole_board() {
        let cache = LeaderboardCache::new();
        cache.publish(vec![entry("a", 1), entry("b", 2)], Utc::now());
        let held = cache.snapshot();

        cache.publish(vec![entry("c", 3)], Utc::now());

        // Earlier readers keep their complete snapshot.
        assert_eq!(held.entries.len(), 2);
        let fresh = cache.snapshot();
        assert_eq!(fresh.entries, vec![entry("c", 3)]);
        assert!(fresh.refreshed_at.is_some());
    }
}
