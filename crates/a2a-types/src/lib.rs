//! Envelope contract for the A2A messaging fabric.
//!
//! This crate defines the canonical `{meta, payload}` envelope shape, the
//! closed set of envelope types, and a pure, total validator. Every other
//! fabric crate (`a2a-transport`, `a2a-registry`, `a2a-security`,
//! `a2a-policy`) builds on top of [`Envelope`] without depending on any of
//! the runtime layers.

pub mod binary;
pub mod envelope;
pub mod error;
pub mod meta;
pub mod payload;
pub mod validate;

pub use envelope::Envelope;
pub use error::{TypesError, TypesResult, ValidationIssue};
pub use meta::{AgentIdentity, Meta, Priority, Recipient, RetryPolicy, A2A_VERSION};
pub use payload::{
    ContextRequest, ContextResult, EnvelopeType, MemoryEvent, Payload, RegistryDiscoveryRequest,
    RegistryDiscoveryResponse, RegistryHeartbeat, SpecialistEventNotification,
    SpecialistInvocationRequest, SpecialistInvocationResult, SystemEvent, TaskOutcome, TaskRequest,
    TaskResult,
};
pub use validate::{validate, ValidationConfig, ValidationOutcome};
