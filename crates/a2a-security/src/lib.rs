//! Wire-level trust for the A2A messaging fabric.
//!
//! Covers bearer and capability token verification, envelope signing and
//! verification, replay protection, and idempotency key derivation /
//! tracking, per §4.4 of the fabric contract.

pub mod capability;
pub mod config;
pub mod error;
pub mod idempotency;
pub mod metrics;
pub mod replay;
pub mod scope;
pub mod signing;
pub mod token;

pub use capability::CapabilityToken;
pub use config::SecurityConfig;
pub use error::{SecurityError, SecurityResult};
pub use idempotency::{generate_idempotency_key, IdempotencyStore, InMemoryIdempotencyStore};
pub use metrics::{MetricsSnapshot, SecurityMetrics};
pub use replay::{check_replay_protection, ReplayConfig};
pub use scope::has_scope;
pub use signing::{canonicalize, SigningAlgorithm};
pub use token::{BearerClaims, TokenConfig, TokenKey};
