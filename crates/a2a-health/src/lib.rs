//! Shared health tasks for the A2A messaging fabric: §4.6.
//!
//! Both the lease-expiry sweeper and the heartbeat publisher are
//! cooperative, cancellable, and restartable — a restarted instance
//! observes whatever state a prior instance persisted through the
//! registry, since neither task holds state of its own beyond the
//! `CancellationToken` wired up in [`task::HealthTask`].

pub mod backoff;
pub mod error;
pub mod heartbeat;
pub mod sweeper;
pub mod task;

pub use backoff::{backoff_base, jittered_delay};
pub use error::{HealthError, HealthResult};
pub use heartbeat::spawn_heartbeat_publisher;
pub use sweeper::spawn_lease_sweeper;
pub use task::HealthTask;
