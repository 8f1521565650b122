//! Error taxonomy for the security layer: §4.4 / §7.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SecurityError {
    #[error("bearer token expired")]
    JwtExpired,

    #[error("bearer token invalid: {0}")]
    JwtInvalid(String),

    #[error("bearer token claims invalid: {0}")]
    JwtInvalidClaims(String),

    #[error("bearer token signature invalid")]
    JwtSignature,

    #[error("envelope signature mismatch")]
    SignatureMismatch,

    #[error("envelope timestamp {0} is in the future beyond allowed skew")]
    ReplayTimestampFuture(String),

    #[error("envelope timestamp {0} is older than the freshness window")]
    ReplayTimestampStale(String),
}

impl SecurityError {
    pub fn code(&self) -> &'static str {
        match self {
            SecurityError::JwtExpired => "E_JWT_EXPIRED",
            SecurityError::JwtInvalid(_) => "E_JWT_INVALID",
            SecurityError::JwtInvalidClaims(_) => "E_JWT_INVALID_CLAIMS",
            SecurityError::JwtSignature => "E_JWT_SIGNATURE",
            SecurityError::SignatureMismatch => "E_SIGNATURE_MISMATCH",
            SecurityError::ReplayTimestampFuture(_) => "E_REPLAY_TIMESTAMP_FUTURE",
            SecurityError::ReplayTimestampStale(_) => "E_REPLAY_TIMESTAMP_STALE",
        }
    }
}

pub type SecurityResult<T> = Result<T, SecurityError>;
