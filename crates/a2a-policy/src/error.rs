//! Error taxonomy for the policy gate: §4.5 / §7.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PolicyError {
    #[error("policy denied: {0:?}")]
    Deny(Vec<String>),

    #[error("policy engine unreachable: {0}")]
    Unavailable(String),
}

impl PolicyError {
    pub fn code(&self) -> &'static str {
        match self {
            PolicyError::Deny(_) => "E_POLICY_DENY",
            PolicyError::Unavailable(_) => "E_POLICY_UNAVAILABLE",
        }
    }

    pub fn reasons(&self) -> &[String] {
        match self {
            PolicyError::Deny(reasons) => reasons,
            PolicyError::Unavailable(_) => &[],
        }
    }
}

pub type PolicyResult<T> = Result<T, PolicyError>;
