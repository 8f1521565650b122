//! Out-of-process policy gate for the A2A messaging fabric.
//!
//! Consulted pre-send and post-receive per §4.5 of the fabric contract.
//! Failure mode is closed: an unreachable engine denies every check unless
//! explicitly disabled.

pub mod config;
pub mod decision;
pub mod error;
pub mod gate;
pub mod metrics;

pub use config::PolicyConfig;
pub use decision::PolicyDecision;
pub use error::{PolicyError, PolicyResult};
pub use gate::PolicyGate;
pub use metrics::{MetricsSnapshot, PolicyMetrics};
