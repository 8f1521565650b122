//! The top-level envelope: `{meta, payload}`.

use crate::meta::{AgentIdentity, Meta, Priority, Recipient};
use crate::payload::{EnvelopeType, Payload};
use serde::{Deserialize, Serialize};

/// A complete, wire-ready envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub meta: Meta,
    pub payload: Payload,
}

impl Envelope {
    /// Build an envelope, deriving `meta.type` from the payload variant so
    /// the two can never silently disagree at construction time.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        message_id: impl Into<String>,
        trace_id: impl Into<String>,
        ts: impl Into<String>,
        from: AgentIdentity,
        to: Vec<Recipient>,
        tenant: impl Into<String>,
        project: impl Into<String>,
        payload: Payload,
    ) -> Self {
        let envelope_type = EnvelopeType::of(&payload);
        Self {
            meta: Meta {
                a2a_version: crate::meta::A2A_VERSION.to_string(),
                message_id: message_id.into(),
                trace_id: trace_id.into(),
                ts: ts.into(),
                from,
                to,
                tenant: tenant.into(),
                project: project.into(),
                envelope_type,
                reply_to: None,
                correlation_id: None,
                priority: None,
                idempotency_key: None,
                deadline: None,
                retry_policy: None,
                metadata: Default::default(),
            },
            payload,
        }
    }

    pub fn with_reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.meta.reply_to = Some(message_id.into());
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.meta.correlation_id = Some(id.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.meta.priority = Some(priority);
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.meta.idempotency_key = Some(key.into());
        self
    }

    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.meta.deadline = Some(deadline.into());
        self
    }

    /// Build a result/response envelope answering `request`, satisfying the
    /// correlation invariants of §3.2: `reply_to` set to the request's
    /// `message_id`, `trace_id` copied verbatim.
    pub fn reply_to(
        request: &Envelope,
        message_id: impl Into<String>,
        ts: impl Into<String>,
        from: AgentIdentity,
        payload: Payload,
    ) -> Self {
        let to = vec![Recipient::Direct(request.meta.from.clone())];
        Envelope::new(
            message_id,
            request.meta.trace_id.clone(),
            ts,
            from,
            to,
            request.meta.tenant.clone(),
            request.meta.project.clone(),
            payload,
        )
        .with_reply_to(request.meta.message_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{Payload, TaskOutcome, TaskRequest, TaskResult};

    fn sample_request() -> Envelope {
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
    fn reply_to_copies_trace_id_and_sets_reply_to() {
        let request = sample_request();
        let result = Envelope::reply_to(
            &request,
            "b".repeat(32),
            "2026-07-27T10:00:01.000Z",
            AgentIdentity::new("agent-2", "specialist", "1"),
            Payload::TaskResult(TaskResult {
                status: TaskOutcome::Success,
                output: None,
                error: None,
            }),
        );
        assert_eq!(result.meta.trace_id, request.meta.trace_id);
        assert_eq!(result.meta.reply_to.as_deref(), Some(request.meta.message_id.as_str()));
    }

    #[test]
    fn new_derives_type_from_payload() {
        let e = sample_request();
        assert_eq!(e.meta.envelope_type, EnvelopeType::TaskRequest);
    }
}
