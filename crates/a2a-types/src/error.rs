//! Error taxonomy for envelope validation.

use thiserror::Error;

/// A single validation failure: the JSON-path-like location and a reason
/// token from the taxonomy below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub reason: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Crate-level error taxonomy. Each variant exposes a stable `code()` token
/// matching the names used throughout `spec.md` §7 so callers can branch on
/// the kind without string matching on the `Display` message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TypesError {
    #[error("envelope failed validation: {0:?}")]
    ValidationFailed(Vec<ValidationIssue>),

    #[error("payload exceeds the configured size cap ({size} > {cap} bytes)")]
    PayloadTooLarge { size: usize, cap: usize },
}

impl TypesError {
    pub fn code(&self) -> &'static str {
        match self {
            TypesError::ValidationFailed(_) => "E_VALIDATION_FAILED",
            TypesError::PayloadTooLarge { .. } => "E_PAYLOAD_TOO_LARGE",
        }
    }
}

pub type TypesResult<T> = Result<T, TypesError>;
