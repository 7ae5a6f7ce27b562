//! Wagerboard - affiliate wager leaderboards
//! Serves the cached cycle board, on-demand previous-cycle and biweekly boards,
//! and keeps itself awake on hosts that idle quiet services.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wagerboard_backend::{
    api,
    leaderboard::LeaderboardCache,
    polling::{spawn_keepalive, spawn_leaderboard_refresh},
    scrapers::{RainbetClient, XfunClient},
    AppState, Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    dotenv().ok();
    init_tracing();

    let config = Config::parse();
    let biweekly = config
        .biweekly()
        .context("Invalid XFUN_WINDOW_START/XFUN_WINDOW_END")?;

    info!("🚀 Wagerboard starting");
    info!(
        "🗓️ Biweekly window: {} -> {}",
        biweekly.window.start().to_rfc3339(),
        biweekly.window.end().to_rfc3339()
    );

    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()
        .context("Failed to build HTTP client")?;

    let state = AppState {
        cycle_source: Arc::new(RainbetClient::new(
            http_client.clone(),
            config.rainbet_api_url.clone(),
            config.rainbet_api_key.clone(),
        )),
        biweekly_source: Arc::new(XfunClient::new(
            http_client.clone(),
            config.xfun_api_url.clone(),
            config.xfun_code.clone(),
            config.xfun_api_key.clone(),
        )),
        cache: Arc::new(LeaderboardCache::new()),
        biweekly,
    };

    let mut pollers = vec![spawn_leaderboard_refresh(
        state.clone(),
        config.refresh_interval(),
    )];
    match config.self_ping_target() {
        Some(url) => pollers.push(spawn_keepalive(
            http_client,
            url.to_string(),
            config.self_ping_interval(),
        )),
        None => info!("Keep-alive ping disabled (SELF_PING_URL not set)"),
    }

    let app = api::create_router(state);

    // Start server
    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    for poller in pollers {
        let name = poller.name();
        poller.shutdown().await;
        info!("Stopped {}", name);
    }

    Ok(())
}

/// Initialize tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "wagerboard_backend=info,wagerboard=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("🛑 Shutdown signal received"),
        Err(e) => {
            // Without a signal handler keep serving until killed.
            tracing::error!("Failed to listen for shutdown signal: {e}");
            std::future::pending::<()>().await
        }
    }
}
