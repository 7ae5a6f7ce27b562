use std::sync::Arc;

use crate::leaderboard::LeaderboardCache;
use crate::models::TimeWindow;
use crate::scrapers::{AffiliateSource, PageSource};

/// Fixed window and paging limits for the biweekly deposit board.
#[derive(Debug, Clone, Copy)]
pub struct BiweeklySettings {
    pub window: TimeWindow,
    pub page_size: u32,
    pub max_pages: u32,
}

/// Application state shared by handlers and background pollers
#[derive(Clone)]
pub struct AppState {
    pub cycle_source: Arc<dyn AffiliateSource>,
    pub biweekly_source: Arc<dyn PageSource>,
    pub cache: Arc<LeaderboardCache>,
    pub biweekly: BiweeklySettings,
}
