//! Leased agent directory for the A2A messaging fabric: §4.3 of the
//! contract.
//!
//! [`Registry`] wraps a pluggable [`store::RegistryStore`] backend (the
//! in-memory [`memory::InMemoryRegistryStore`] by default, or
//! [`sql::SqlRegistryStore`] behind the `sql` feature) with the wall clock,
//! metrics, and structured logging every call needs.

pub mod agent;
pub mod config;
pub mod error;
pub mod filters;
pub mod memory;
pub mod metrics;
pub mod registry;
pub mod store;

#[cfg(feature = "sql")]
pub mod sql;

pub use agent::{AgentRecord, AgentStatus, AgentTopic, Lease, Registration, TopicRole};
pub use config::RegistryConfig;
pub use error::{RegistryError, RegistryResult};
pub use filters::{DiscoverFilters, DiscoverResult};
pub use memory::InMemoryRegistryStore;
pub use metrics::{MetricsSnapshot, RegistryMetrics};
pub use registry::Registry;
pub use store::RegistryStore;

#[cfg(feature = "sql")]
pub use sql::SqlRegistryStore;
