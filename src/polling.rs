//! Background interval tasks.
//!
//! Each poller runs its job once immediately, then on every tick. Dropping or shutting down
//! the [`PollerHandle`] stops the loop; a job already in flight is allowed to finish.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::leaderboard::service::refresh_current;
use crate::state::AppState;

pub struct PollerHandle {
    name: &'static str,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stop ticking and wait for the task to exit.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            warn!(poller = self.name, "Poller task ended abnormally: {e}");
        }
    }
}

pub fn spawn_poller<F, Fut>(name: &'static str, period: Duration, mut job: F) -> PollerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (stop, mut stopped) = watch::channel(false);
    let period = period.max(Duration::from_millis(1));

    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => job().await,
                // Fires on an explicit stop and when the handle is dropped.
                _ = stopped.changed() => break,
            }
        }

        debug!(poller = name, "Poller stopped");
    });

    PollerHandle { name, stop, task }
}

/// Keep the cached cycle board fresh.
pub fn spawn_leaderboard_refresh(state: AppState, period: Duration) -> PollerHandle {
    info!(
        "🔄 Starting leaderboard refresher ({}s interval)",
        period.as_secs()
    );

    spawn_poller("leaderboard-refresh", period, move || {
        let state = state.clone();
        async move {
            let now = Utc::now();
            match refresh_current(state.cycle_source.as_ref(), &state.cache, now).await {
                Ok(count) => info!(entries = count, "✅ Leaderboard updated ({})", now.to_rfc3339()),
                Err(e) => error!("❌ Leaderboard refresh failed, keeping previous board: {e}"),
            }
        }
    })
}

/// Periodically GET our own public URL so the hosting platform does not idle the service.
pub fn spawn_keepalive(client: reqwest::Client, url: String, period: Duration) -> PollerHandle {
    info!("🔁 Keep-alive ping enabled for {} every {}s", url, period.as_secs());

    spawn_poller("keepalive", period, move || {
        let client = client.clone();
        let url = url.clone();
        async move {
            match client.get(&url).send().await {
                Ok(resp) => debug!(status = resp.status().as_u16(), "Self-pinged {}", url),
                Err(e) => warn!("⚠️ Self-ping of {} failed: {e}", url),
            }
        }
    })
}
