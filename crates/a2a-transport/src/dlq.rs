//! Building the dead-letter record written on `reject` and on auto-reject.
//!
//! The DLQ is itself a topic (`<topic>:dlq`) per the contract, so a DLQ
//! entry has to be a regular [`Envelope`] like everything else the log
//! carries. We wrap the rejected envelope in a `SystemEvent` whose
//! `details` map carries the reason, the rejecting consumer, and the
//! original envelope verbatim so tooling can drain and replay it.
use a2a_types::{AgentIdentity, Envelope, Payload, Recipient, SystemEvent};
use std::collections::HashMap;

pub const REASON_SCHEMA_INVALID: &str = "schema_invalid";
pub const REASON_MAX_REDELIVERIES: &str = "max_redeliveries";

/// Name of the sibling DLQ topic for `topic`.
pub fn dlq_topic_name(topic: &str) -> String {
    format!("{topic}:dlq")
}

/// Build the envelope appended to `<topic>:dlq` for a rejected message.
pub fn build_dlq_record(
    topic: &str,
    original: &Envelope,
    reason: &str,
    consumer: &str,
    ts: impl Into<String>,
    message_id: impl Into<String>,
) -> Envelope {
    let mut details = HashMap::new();
    details.insert("reason".to_string(), serde_json::Value::String(reason.to_string()));
    details.insert("consumer".to_string(), serde_json::Value::String(consumer.to_string()));
    details.insert(
        "original_message_id".to_string(),
        serde_json::Value::String(original.meta.message_id.clone()),
    );
    details.insert(
        "envelope".to_string(),
        serde_json::to_value(original).unwrap_or(serde_json::Value::Null),
    );

    Envelope::new(
        message_id,
        original.meta.trace_id.clone(),
        ts,
        AgentIdentity::new("a2a-transport", "transport", "1"),
        vec![Recipient::topic(dlq_topic_name(topic))],
        original.meta.tenant.clone(),
        original.meta.project.clone(),
        Payload::SystemEvent(SystemEvent {
            event: "dlq_reject".to_string(),
            details,
        }),
    )
}
