//! Top-level error taxonomy: wraps every layer's error so callers at the
//! fabric boundary have one `Result` type to match on.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FabricError {
    #[error(transparent)]
    Types(#[from] a2a_types::TypesError),

    #[error(transparent)]
    Transport(#[from] a2a_transport::TransportError),

    #[error(transparent)]
    Registry(#[from] a2a_registry::RegistryError),

    #[error(transparent)]
    Security(#[from] a2a_security::SecurityError),

    #[error(transparent)]
    Policy(#[from] a2a_policy::PolicyError),

    #[error(transparent)]
    Health(#[from] a2a_health::HealthError),

    #[error("fabric configuration invalid: {0}")]
    Config(String),
}

impl FabricError {
    pub fn code(&self) -> &'static str {
        match self {
            FabricError::Types(e) => e.code(),
            FabricError::Transport(e) => e.code(),
            FabricError::Registry(e) => e.code(),
            FabricError::Security(e) => e.code(),
            FabricError::Policy(e) => e.code(),
            FabricError::Health(e) => e.code(),
            FabricError::Config(_) => "E_CONFIG_INVALID",
        }
    }
}

pub type FabricResult<T> = Result<T, FabricError>;
