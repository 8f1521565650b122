//! Durable, at-least-once streaming transport for the A2A messaging fabric.
//!
//! Named topics carry envelopes; consumer groups claim them with explicit
//! `ack`/`nack`/`reject`, a sibling `<topic>:dlq` topic collects rejects,
//! and per-subscription backpressure keeps a slow handler from ever being
//! visible to publishers.

pub mod ack;
pub mod backpressure;
pub mod config;
pub mod dlq;
pub mod error;
pub mod metrics;
pub mod subscription;
pub mod topic;
pub mod transport;

pub use ack::AckHandle;
pub use backpressure::BackpressureConfig;
pub use config::{IdempotencyChecker, SubscribeOptions, TransportConfig};
pub use dlq::{dlq_topic_name, REASON_MAX_REDELIVERIES, REASON_SCHEMA_INVALID};
pub use error::{TransportError, TransportResult};
pub use metrics::{MetricsSnapshot, TransportMetrics};
pub use subscription::Subscription;
pub use transport::Transport;
