//! Leaderboard domain: billing cycles, aggregation, masking and the published board.

pub mod builder;
pub mod cache;
pub mod mask;
pub mod period;
pub mod service;

pub use builder::{build, Rounding, MAX_ENTRIES};
pub use cache::{LeaderboardCache, LeaderboardSnapshot};
pub use mask::mask_username;
pub use period::{period_bounds, period_bounds_at};
