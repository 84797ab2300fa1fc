//! Periodic eviction of finished and failed session records

use crate::session::SessionStore;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// How often to sweep for a given grace period
pub(crate) fn sweep_interval(grace: Duration) -> Duration {
    grace.clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL)
}

/// Spawn a task that evicts terminal records older than `grace`, forever
pub(crate) fn spawn_sweeper(sessions: SessionStore, grace: Duration) -> JoinHandle<()> {
    let period = sweep_interval(grace);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let evicted = sessions.evict_terminal(grace);
            if evicted > 0 {
                tracing::info!(evicted, grace_secs = grace.as_secs(), "swept expired sessions");
            }
        }
    })
}
