//! Pure envelope validation: §4.1 of the contract.
//!
//! `validate` never performs I/O and always terminates with a decision —
//! Testable Property 1 ("validation totality"). Payload-depth checking is
//! bounded by `ValidationConfig::max_payload_depth` so cost does not grow
//! past the configured cap regardless of how deep a malicious payload goes.

use crate::envelope::Envelope;
use crate::error::ValidationIssue;
use crate::meta::A2A_VERSION;
use crate::payload::EnvelopeType;
use serde_json::Value;

/// Tunables for [`validate`].
#[derive(Debug, Clone, Copy)]
pub struct ValidationConfig {
    /// Payloads nested deeper than this are rejected with
    /// `E_PAYLOAD_TOO_LARGE` rather than walked further.
    pub max_payload_depth: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_payload_depth: 32,
        }
    }
}

/// Outcome of validating one envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    fn push(&mut self, path: &str, reason: &str) {
        self.valid = false;
        self.errors.push(ValidationIssue::new(path, reason));
    }
}

/// Validate an envelope against the common `meta` schema and dispatch to
/// the payload/type consistency check. Pure; never panics, never blocks.
pub fn validate(envelope: &Envelope, config: &ValidationConfig) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::ok();
    let meta = &envelope.meta;

    if meta.a2a_version != A2A_VERSION {
        outcome.push("meta.a2a_version", "unsupported_version");
    }

    if !is_valid_message_id(&meta.message_id) {
        outcome.push("meta.message_id", "invalid_format");
    }

    if meta.trace_id.trim().is_empty() {
        outcome.push("meta.trace_id", "required_field_missing");
    }

    if chrono::DateTime::parse_from_rfc3339(&meta.ts).is_err() {
        outcome.push("meta.ts", "invalid_timestamp");
    }

    if meta.from.id.trim().is_empty() {
        outcome.push("meta.from.id", "required_field_missing");
    }

    if meta.to.is_empty() {
        outcome.push("meta.to", "empty_recipient_list");
    }
    for (i, recipient) in meta.to.iter().enumerate() {
        if let crate::meta::Recipient::Direct(id) = recipient {
            if id.id.trim().is_empty() {
                outcome.push(&format!("meta.to[{i}].id"), "required_field_missing");
            }
        }
    }

    if meta.tenant.trim().is_empty() {
        outcome.push("meta.tenant", "required_field_missing");
    }
    if meta.project.trim().is_empty() {
        outcome.push("meta.project", "required_field_missing");
    }

    let declared = EnvelopeType::of(&envelope.payload);
    if declared != meta.envelope_type {
        outcome.push("meta.type", "type_payload_mismatch");
    }

    if let Ok(value) = serde_json::to_value(&envelope.payload) {
        if depth_exceeds(&value, config.max_payload_depth) {
            outcome.push("payload", "E_PAYLOAD_TOO_LARGE");
        }
    }

    outcome
}

fn is_valid_message_id(id: &str) -> bool {
    id.len() >= 32 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Returns `true` as soon as nesting exceeds `cap`, without descending
/// further — bounds the work to `O(cap)` stack depth regardless of how
/// deep the actual payload is.
fn depth_exceeds(value: &Value, cap: usize) -> bool {
    fn walk(value: &Value, remaining: usize) -> bool {
        if remaining == 0 {
            return matches!(value, Value::Object(_) | Value::Array(_))
                && !is_empty_container(value);
        }
        match value {
            Value::Object(map) => map.values().any(|v| walk(v, remaining - 1)),
            Value::Array(items) => items.iter().any(|v| walk(v, remaining - 1)),
            _ => false,
        }
    }

    fn is_empty_container(value: &Value) -> bool {
        match value {
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => true,
        }
    }

    walk(value, cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{AgentIdentity, Recipient};
    use crate::payload::{Payload, TaskRequest};

    fn base() -> Envelope {
        Envelope::new(
            "a".repeat(32),
            "trace-1",
            "2026-07-27T10:00:00.000Z",
            AgentIdentity::new("coordinator-1", "coordinator", "1"),
            vec![Recipient::direct("agent-2", "specialist", "1")],
            "wesign",
            "proj-1",
            Payload::TaskRequest(TaskRequest {
                task: "review".into(),
                inputs: serde_json::json!({}),
            }),
        )
    }

    #[test]
    fn s1_valid_envelope_passes() {
        let envelope = base();
        let outcome = validate(&envelope, &ValidationConfig::default());
        assert!(outcome.valid, "{:?}", outcome.errors);
    }

    #[test]
    fn s1_empty_recipients_fails() {
        let mut envelope = base();
        envelope.meta.to.clear();
        let outcome = validate(&envelope, &ValidationConfig::default());
        assert!(!outcome.valid);
        assert!(outcome.errors.iter().any(|e| e.path == "meta.to"));
    }

    #[test]
    fn wrong_version_fails() {
        let mut envelope = base();
        envelope.meta.a2a_version = "2.0".into();
        let outcome = validate(&envelope, &ValidationConfig::default());
        assert!(!outcome.valid);
    }

    #[test]
    fn short_message_id_fails() {
        let mut envelope = base();
        envelope.meta.message_id = "deadbeef".into();
        let outcome = validate(&envelope, &ValidationConfig::default());
        assert!(!outcome.valid);
    }

    #[test]
    fn uppercase_message_id_fails() {
        let mut envelope = base();
        envelope.meta.message_id = "A".repeat(32);
        let outcome = validate(&envelope, &ValidationConfig::default());
        assert!(!outcome.valid);
    }

    #[test]
    fn malformed_timestamp_fails() {
        let mut envelope = base();
        envelope.meta.ts = "not-a-date".into();
        let outcome = validate(&envelope, &ValidationConfig::default());
        assert!(!outcome.valid);
    }

    #[test]
    fn deeply_nested_payload_rejected() {
        let mut nested = serde_json::json!({"leaf": true});
        for _ in 0..40 {
            nested = serde_json::json!({ "inner": nested });
        }
        let mut envelope = base();
        envelope.payload = Payload::TaskRequest(TaskRequest {
            task: "review".into(),
            inputs: nested,
        });
        let outcome = validate(&envelope, &ValidationConfig { max_payload_depth: 8 });
        assert!(!outcome.valid);
        assert!(outcome.errors.iter().any(|e| e.reason == "E_PAYLOAD_TOO_LARGE"));
    }

    #[test]
    fn validation_is_total_never_panics() {
        let mut envelope = base();
        envelope.meta.message_id.clear();
        envelope.meta.trace_id.clear();
        envelope.meta.tenant.clear();
        envelope.meta.project.clear();
        envelope.meta.to.clear();
        let outcome = validate(&envelope, &ValidationConfig::default());
        assert!(!outcome.valid);
        assert!(outcome.errors.len() >= 4);
    }
}
