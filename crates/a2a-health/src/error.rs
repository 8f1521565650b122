//! Error taxonomy for health tasks. These wrap registry failures
//! surfaced while sweeping or publishing heartbeats.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HealthError {
    #[error("registry unavailable during health task: {0}")]
    RegistryUnavailable(String),
}

impl HealthError {
    pub fn code(&self) -> &'static str {
        match self {
            HealthError::RegistryUnavailable(_) => "E_REGISTRY_UNAVAILABLE",
        }
    }
}

pub type HealthResult<T> = Result<T, HealthError>;
