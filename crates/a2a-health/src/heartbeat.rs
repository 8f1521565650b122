//! Heartbeat publisher: §4.6.
//!
//! One task per live agent, refreshing its lease at an interval well
//! inside the lease duration so a single missed tick never drops the
//! agent. The caller supplies a `status_provider` closure consulted on
//! each tick; if it returns an error, the previous status is republished
//! so a transient health-check failure does not itself cause the agent to
//! be marked down by a stale lease.

use crate::backoff::{backoff_base, jittered_delay};
use crate::task::HealthTask;
use a2a_registry::{AgentStatus, Registry};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const BACKOFF_FLOOR: Duration = Duration::from_millis(100);
const BACKOFF_CEILING: Duration = Duration::from_secs(10);

/// Spawn a heartbeat publisher for `agent_id`. `interval` should be a
/// fraction of the agent's lease duration (the fabric convention is
/// `lease_duration / 3`) so at least two heartbeats land before expiry.
pub fn spawn_heartbeat_publisher<F>(
    registry: Registry,
    agent_id: String,
    lease_duration: Duration,
    interval: Duration,
    status_provider: F,
) -> HealthTask
where
    F: Fn() -> Result<AgentStatus, String> + Send + Sync + 'static,
{
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();
    let status_provider = Arc::new(status_provider);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut last_status = AgentStatus::Healthy;
        let mut consecutive_failures: u32 = 0;

        loop {
            tokio::select! {
                _ = task_cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if task_cancel.is_cancelled() {
                break;
            }

            let status = match status_provider() {
                Ok(status) => {
                    last_status = status;
                    status
                }
                Err(err) => {
                    tracing::warn!(agent_id, error = %err, "status provider failed, republishing previous status");
                    last_status
                }
            };

            match registry.heartbeat(&agent_id, Some(status), Some(lease_duration)).await {
                Ok(lease) => {
                    consecutive_failures = 0;
                    tracing::debug!(agent_id, lease_until = %lease.lease_until, "heartbeat published");
                }
                Err(err) => {
                    tracing::warn!(agent_id, error = %err, code = err.code(), "heartbeat publish failed");
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

#[cfg(test)]
mod tests {
    use super::*;
    use a2a_registry::{DiscoverFilters, InMemoryRegistryStore, RegistryConfig, Registration};
    use std::sync::Arc;

    // Real (unpaused) sleep: `Registry` derives "now" from the wall clock
    // (`chrono::Utc::now()`), which tokio's paused virtual clock does not
    // advance, so this needs real elapsed time to exercise the renewal.
    #[tokio::test]
    async fn publisher_keeps_lease_alive_past_its_own_duration() {
        let registry = Registry::new(Arc::new(InMemoryRegistryStore::new()), RegistryConfig::default());
        let lease_duration = Duration::from_millis(60);
        registry
            .register(Registration::new("a", "1", "t", "p").with_lease_duration(lease_duration))
            .await
            .unwrap();

        let task = spawn_heartbeat_publisher(
            registry.clone(),
            "a".to_string(),
            lease_duration,
            lease_duration / 3,
            || Ok(AgentStatus::Healthy),
        );

        // Real elapsed time exceeds the lease duration; the publisher's
        // renewals should have kept it alive regardless.
        tokio::time::sleep(Duration::from_millis(150)).await;

        registry.mark_expired_agents().await.unwrap();
        let result = registry
            .discover(DiscoverFilters::new().with_agent_id("a"))
            .await
            .unwrap();
        assert_eq!(result.agents[0].status, AgentStatus::Healthy);

        task.stop().await;
    }

    #[tokio::test]
    async fn failing_status_provider_falls_back_to_previous_status() {
        let registry = Registry::new(Arc::new(InMemoryRegistryStore::new()), RegistryConfig::default());
        registry
            .register(Registration::new("a", "1", "t", "p").with_status(AgentStatus::Healthy))
            .await
            .unwrap();

        let task = spawn_heartbeat_publisher(
            registry.clone(),
            "a".to_string(),
            Duration::from_secs(60),
            Duration::from_millis(5),
            || Err("health check unreachable".to_string()),
        );

        tokio::time::sleep(Duration::from_millis(20)).await;

        let result = registry
            .discover(DiscoverFilters::new().with_agent_id("a"))
            .await
            .unwrap();
        assert_eq!(result.agents[0].status, AgentStatus::Healthy);

        task.stop().await;
    }
}
