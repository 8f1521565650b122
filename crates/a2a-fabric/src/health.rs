//! Thin wiring from [`FabricContext`] into `a2a-health`'s background
//! tasks, so a binary doesn't need to reach past the fabric facade to
//! start the sweeper or a heartbeat publisher.

use crate::context::FabricContext;
use a2a_health::{spawn_heartbeat_publisher, spawn_lease_sweeper, HealthTask};
use a2a_registry::AgentStatus;
use std::time::Duration;

/// Start the lease-expiry sweeper on `ctx.registry()`'s configured
/// interval.
pub fn start_lease_sweeper(ctx: &FabricContext) -> HealthTask {
    let interval = ctx.registry().config().sweep_interval;
    spawn_lease_sweeper(ctx.registry().clone(), interval)
}

/// Start a heartbeat publisher for `agent_id`, ticking at
/// `lease_duration / 3` and reporting `status_provider`'s result each
/// round.
pub fn start_heartbeat_publisher<F>(
    ctx: &FabricContext,
    agent_id: impl Into<String>,
    lease_duration: Duration,
    status_provider: F,
) -> HealthTask
where
    F: Fn() -> Result<AgentStatus, String> + Send + Sync + 'static,
{
    spawn_heartbeat_publisher(
        ctx.registry().clone(),
        agent_id.into(),
        lease_duration,
        lease_duration / 3,
        status_provider,
    )
}
