//! Retention sweep for finished jobs
//!
//! The job store never expires anything on its own; the server runs this
//! sweep in the background to bound memory.

use crate::pipeline::clock::Clock;
use crate::storage::JobStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Removes terminal jobs older than `retention` once
///
/// Returns the number of jobs removed.
pub fn sweep_once(store: &dyn JobStore, clock: &dyn Clock, retention: Duration) -> usize {
    let max_age = chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::MAX);
    let removed = store.sweep_expired(clock.now(), max_age);
    if removed > 0 {
        tracing::debug!(removed, remaining = store.len(), "Swept expired jobs");
    }
    removed
}

/// Spawns a task sweeping the store every `interval`
///
/// The task runs until aborted through the returned handle.
pub fn spawn_retention_sweeper(
    store: Arc<dyn JobStore>,
    clock: Arc<dyn Clock>,
    retention: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tracing::info!(
        "Finished jobs are kept for {:?}, swept every {:?}",
        retention,
        interval
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            sweep_once(store.as_ref(), clock.as_ref(), retention);
        }
    })
}
