//! Lease-expiry sweeper: §4.6, testable property 7.
//!
//! A periodic background task that calls [`Registry::mark_expired_agents`]
//! on a fixed interval. Safe across multiple replicas: the underlying
//! update is an atomic conditional transition, so redundant sweepers are
//! harmless (each simply observes zero additional rows on most ticks).

use crate::backoff::{backoff_base, jittered_delay};
use crate::task::HealthTask;
use a2a_registry::Registry;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const BACKOFF_FLOOR: Duration = Duration::from_millis(200);
const BACKOFF_CEILING: Duration = Duration::from_secs(30);

/// Spawn the sweeper, ticking every `interval`. The first sweep runs after
/// the first tick, not immediately, to avoid a thundering herd at startup
/// when many replicas spawn simultaneously. A registry call that fails with
/// `E_REGISTRY_UNAVAILABLE` backs off with growing jitter (spec §4.3.4)
/// before the next regular tick, instead of retrying at the bare interval.
pub fn spawn_lease_sweeper(registry: Registry, interval: Duration) -> HealthTask {
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut consecutive_failures: u32 = 0;

        loop {
            tokio::select! {
                _ = task_cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if task_cancel.is_cancelled() {
                break;
            }
            match registry.mark_expired_agents().await {
                Ok(count) => {
                    consecutive_failures = 0;
                    if count > 0 {
                        tracing::info!(expired = count, "lease sweep completed");
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, code = err.code(), "lease sweep failed");
                    let delay = jittered_delay(
                        backoff_base(BACKOFF_FLOOR, BACKOFF_CEILING, consecutive_failures),
                        BACKOFF_CEILING,
                    );
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    tokio::select! {
                        _ = task_cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    });

    HealthTask { cancel, task }
}
