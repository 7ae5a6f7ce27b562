//! Wagerboard Backend Library
//!
//! Affiliate wager leaderboards: billing-cycle windows, upstream aggregation and the
//! HTTP surface that serves the boards. `main.rs` only wires these together.

pub mod api;
pub mod config;
pub mod error;
pub mod leaderboard;
pub mod middleware;
pub mod models;
pub mod polling;
pub mod scrapers;
pub mod state;

pub use config::Config;
pub use state::{AppState, BiweeklySettings};
