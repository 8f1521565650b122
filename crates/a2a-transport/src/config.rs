//! Construction-time transport options and per-subscription options.
//!
//! Everything here is an explicit options struct passed at construction —
//! no implicit globals, no lazily-initialized singletons.

use crate::backpressure::BackpressureConfig;
use a2a_types::{Envelope, ValidationConfig};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Options for a [`crate::Transport`] instance.
#[derive(Clone)]
pub struct TransportConfig {
    /// Validate envelopes before they are appended on `publish`.
    pub validate_on_publish: bool,
    /// Validate stored bytes before handing them to a subscription's
    /// handler; failures are rejected to DLQ with reason `schema_invalid`.
    pub validate_on_subscribe: bool,
    /// Ceiling on redelivery attempts before the transport auto-rejects a
    /// message to DLQ with reason `max_redeliveries`.
    pub max_redeliveries: u32,
    /// Default `maxPending` applied when a subscription does not specify
    /// one explicitly.
    pub default_max_pending: usize,
    /// Shared validator tunables (payload depth cap, etc).
    pub validation: ValidationConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            validate_on_publish: true,
            validate_on_subscribe: true,
            max_redeliveries: 5,
            default_max_pending: 64,
            validation: ValidationConfig::default(),
        }
    }
}

/// A boxed, cloneable idempotency check invoked with the full envelope
/// before the handler runs; a return of `true` means "already processed".
///
/// Deriving the actual idempotency key is a security-layer concern (see the
/// fabric's wiring of `a2a-security`'s key derivation into this hook) — the
/// transport only knows how to call the checker it was handed.
pub type IdempotencyChecker =
    Arc<dyn Fn(Envelope) -> Pin<Box<dyn Future<Output = bool> + Send>> + Send + Sync>;

/// Options passed to [`crate::Transport::subscribe`].
#[derive(Clone)]
pub struct SubscribeOptions {
    pub consumer_group: String,
    pub consumer_name: String,
    pub backpressure: BackpressureConfig,
    pub check_idempotency: Option<IdempotencyChecker>,
}

impl SubscribeOptions {
    pub fn new(consumer_group: impl Into<String>, consumer_name: impl Into<String>) -> Self {
        Self {
            consumer_group: consumer_group.into(),
            consumer_name: consumer_name.into(),
            backpressure: BackpressureConfig::default(),
            check_idempotency: None,
        }
    }

    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.backpressure = BackpressureConfig::new(max_pending);
        self
    }

    pub fn with_checker(mut self, checker: IdempotencyChecker) -> Self {
        self.check_idempotency = Some(checker);
        self
    }
}
