//! Error taxonomy for the transport layer.

use a2a_types::ValidationIssue;
use thiserror::Error;

/// Errors surfaced by [`crate::Transport`] operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// `validateOnPublish` rejected the envelope before it was appended.
    #[error("envelope failed validation: {0:?}")]
    ValidationFailed(Vec<ValidationIssue>),

    /// The broker backing this transport is unreachable. Callers retry with
    /// backoff; no partial append is observable.
    #[error("transport backend unavailable: {0}")]
    Unavailable(String),

    /// `ack`/`nack`/`reject` referenced a message no longer in the group's
    /// pending set (already resolved, or the subscription was drained).
    #[error("message {0} is not pending in group {1}")]
    NotPending(u64, String),

    /// The named topic does not exist and auto-creation was disallowed.
    #[error("topic not found: {0}")]
    TopicNotFound(String),
}

impl TransportError {
    pub fn code(&self) -> &'static str {
        match self {
            TransportError::ValidationFailed(_) => "E_VALIDATION_FAILED",
            TransportError::Unavailable(_) => "E_TRANSPORT_UNAVAILABLE",
            TransportError::NotPending(..) => "E_NOT_PENDING",
            TransportError::TopicNotFound(_) => "E_TOPIC_NOT_FOUND",
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
