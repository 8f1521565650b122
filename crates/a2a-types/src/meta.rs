//! Envelope metadata: the common `meta` block shared by every envelope type.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Literal protocol version string every envelope must carry.
pub const A2A_VERSION: &str = "1.0";

/// Identity of the agent that produced or should receive an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub id: String,
    #[serde(rename = "type")]
    pub agent_type: String,
    pub version: String,
}

impl AgentIdentity {
    pub fn new(id: impl Into<String>, agent_type: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            agent_type: agent_type.into(),
            version: version.into(),
        }
    }
}

/// A recipient of an envelope: either a direct agent reference or a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipient {
    /// A direct agent identity.
    Direct(AgentIdentity),
    /// A topic fan-out target.
    Topic {
        #[serde(rename = "type")]
        kind: TopicMarker,
        name: String,
    },
}

/// Marker carried by topic recipients; always the literal string `"topic"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopicMarker {
    #[serde(rename = "topic")]
    Topic,
}

impl Recipient {
    pub fn direct(id: impl Into<String>, agent_type: impl Into<String>, version: impl Into<String>) -> Self {
        Self::Direct(AgentIdentity::new(id, agent_type, version))
    }

    pub fn topic(name: impl Into<String>) -> Self {
        Self::Topic {
            kind: TopicMarker::Topic,
            name: name.into(),
        }
    }
}

/// Delivery priority. Ordered so that `Urgent > High > Normal > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// Sender-supplied retry guidance; advisory only, not enforced by the
/// transport. Callers that want transport-level redelivery limits use
/// the transport's own configuration instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

/// The envelope's common metadata block (`meta`).
///
/// Required fields follow §3.1 of the envelope contract; everything marked
/// `Option` is optional on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub a2a_version: String,
    pub message_id: String,
    pub trace_id: String,
    pub ts: String,
    pub from: AgentIdentity,
    pub to: Vec<Recipient>,
    pub tenant: String,
    pub project: String,
    #[serde(rename = "type")]
    pub envelope_type: crate::payload::EnvelopeType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,

    /// Opaque metadata. Unknown keys here are always allowed; this is the
    /// one place in the contract where shape is deliberately not fixed.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}
