//! The closed set of envelope types and their per-type payload shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The closed set of envelope types named in the contract.
///
/// Serializes as the exact literal type name (`"TaskRequest"`, ...). Every
/// payload variant below corresponds 1:1 to a member of this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvelopeType {
    TaskRequest,
    TaskResult,
    MemoryEvent,
    ContextRequest,
    ContextResult,
    SpecialistInvocationRequest,
    SpecialistInvocationResult,
    RegistryHeartbeat,
    RegistryDiscoveryRequest,
    RegistryDiscoveryResponse,
    SystemEvent,
    SpecialistEventNotification,
}

impl EnvelopeType {
    /// The canonical name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeType::TaskRequest => "TaskRequest",
            EnvelopeType::TaskResult => "TaskResult",
            EnvelopeType::MemoryEvent => "MemoryEvent",
            EnvelopeType::ContextRequest => "ContextRequest",
            EnvelopeType::ContextResult => "ContextResult",
            EnvelopeType::SpecialistInvocationRequest => "SpecialistInvocationRequest",
            EnvelopeType::SpecialistInvocationResult => "SpecialistInvocationResult",
            EnvelopeType::RegistryHeartbeat => "RegistryHeartbeat",
            EnvelopeType::RegistryDiscoveryRequest => "RegistryDiscoveryRequest",
            EnvelopeType::RegistryDiscoveryResponse => "RegistryDiscoveryResponse",
            EnvelopeType::SystemEvent => "SystemEvent",
            EnvelopeType::SpecialistEventNotification => "SpecialistEventNotification",
        }
    }

    /// The envelope type this payload variant declares itself as.
    pub fn of(payload: &Payload) -> EnvelopeType {
        match payload {
            Payload::TaskRequest(_) => EnvelopeType::TaskRequest,
            Payload::TaskResult(_) => EnvelopeType::TaskResult,
            Payload::MemoryEvent(_) => EnvelopeType::MemoryEvent,
            Payload::ContextRequest(_) => EnvelopeType::ContextRequest,
            Payload::ContextResult(_) => EnvelopeType::ContextResult,
            Payload::SpecialistInvocationRequest(_) => EnvelopeType::SpecialistInvocationRequest,
            Payload::SpecialistInvocationResult(_) => EnvelopeType::SpecialistInvocationResult,
            Payload::RegistryHeartbeat(_) => EnvelopeType::RegistryHeartbeat,
            Payload::RegistryDiscoveryRequest(_) => EnvelopeType::RegistryDiscoveryRequest,
            Payload::RegistryDiscoveryResponse(_) => EnvelopeType::RegistryDiscoveryResponse,
            Payload::SystemEvent(_) => EnvelopeType::SystemEvent,
            Payload::SpecialistEventNotification(_) => EnvelopeType::SpecialistEventNotification,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub task: String,
    #[serde(default)]
    pub inputs: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    Success,
    Failure,
    Partial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub status: TaskOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEvent {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextResult {
    pub context: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistInvocationRequest {
    pub specialist: String,
    pub task: String,
    #[serde(default)]
    pub inputs: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistInvocationResult {
    pub specialist: String,
    pub status: TaskOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryHeartbeat {
    pub agent_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_duration_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryDiscoveryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryDiscoveryResponse {
    pub agents: Vec<Value>,
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemEvent {
    pub event: String,
    #[serde(default)]
    pub details: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistEventNotification {
    pub specialist: String,
    pub event: String,
    #[serde(default)]
    pub details: HashMap<String, Value>,
}

/// The envelope's typed body. Serializes externally-tagged (`{"TaskRequest":
/// {...}}`) so the wire form is self-describing independent of `meta.type`;
/// [`crate::validate::validate`] checks the two agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    TaskRequest(TaskRequest),
    TaskResult(TaskResult),
    MemoryEvent(MemoryEvent),
    ContextRequest(ContextRequest),
    ContextResult(ContextResult),
    SpecialistInvocationRequest(SpecialistInvocationRequest),
    SpecialistInvocationResult(SpecialistInvocationResult),
    RegistryHeartbeat(RegistryHeartbeat),
    RegistryDiscoveryRequest(RegistryDiscoveryRequest),
    RegistryDiscoveryResponse(RegistryDiscoveryResponse),
    SystemEvent(SystemEvent),
    SpecialistEventNotification(SpecialistEventNotification),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_type_of_matches_variant() {
        let p = Payload::TaskRequest(TaskRequest {
            task: "review".into(),
            inputs: Value::Null,
        });
        assert_eq!(EnvelopeType::of(&p), EnvelopeType::TaskRequest);
    }

    #[test]
    fn type_name_roundtrip() {
        let json = serde_json::to_string(&EnvelopeType::SpecialistInvocationResult).unwrap();
        assert_eq!(json, "\"SpecialistInvocationResult\"");
        let back: EnvelopeType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EnvelopeType::SpecialistInvocationResult);
    }
}
