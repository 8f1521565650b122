//! Error taxonomy for the registry layer.

use thiserror::Error;

/// Errors surfaced by [`crate::Registry`] and [`crate::store::RegistryStore`]
/// operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// `heartbeat` was called for an `agent_id` with no registered row.
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    /// The directory backend could not be reached. Callers retry
    /// registrations/heartbeats with jittered backoff.
    #[error("registry backend unavailable: {0}")]
    Unavailable(String),
}

impl RegistryError {
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::AgentNotFound(_) => "E_AGENT_NOT_FOUND",
            RegistryError::Unavailable(_) => "E_REGISTRY_UNAVAILABLE",
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
