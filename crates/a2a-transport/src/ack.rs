//! The `ack`/`nack`/`reject` handle passed to every subscription handler.

use crate::backpressure::PendingGate;
use crate::dlq::build_dlq_record;
use crate::metrics::TransportMetrics;
use crate::topic::Topic;
use a2a_types::Envelope;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct Inner {
    topic: Arc<Topic>,
    topic_name: String,
    dlq_topic: Arc<Topic>,
    group: String,
    offset: u64,
    consumer: String,
    envelope: Envelope,
    gate: Arc<PendingGate>,
    metrics: Arc<TransportMetrics>,
    resolved: AtomicBool,
}

/// Handle exposing `ack()`, `nack()`, `reject(reason)` for one delivered
/// message. Resolution is idempotent: only the first call of any of the
/// three has an effect.
#[derive(Clone)]
pub struct AckHandle(Arc<Inner>);

impl AckHandle {
    pub(crate) fn new(
        topic: Arc<Topic>,
        topic_name: String,
        dlq_topic: Arc<Topic>,
        group: String,
        offset: u64,
        consumer: String,
        envelope: Envelope,
        gate: Arc<PendingGate>,
        metrics: Arc<TransportMetrics>,
    ) -> Self {
        Self(Arc::new(Inner {
            topic,
            topic_name,
            dlq_topic,
            group,
            offset,
            consumer,
            envelope,
            gate,
            metrics,
            resolved: AtomicBool::new(false),
        }))
    }

    fn claim_resolution(&self) -> bool {
        self.0
            .resolved
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Remove the message from the group's pending set.
    pub async fn ack(&self) {
        if !self.claim_resolution() {
            return;
        }
        self.0.topic.ack(&self.0.group, self.0.offset);
        self.0.metrics.record_acked();
        self.0.gate.mark_resolved();
    }

    /// Return the message for later redelivery (does not count toward DLQ).
    pub async fn nack(&self) {
        if !self.claim_resolution() {
            return;
        }
        self.0.topic.nack(&self.0.group, self.0.offset);
        self.0.metrics.record_nacked();
        self.0.gate.mark_resolved();
    }

    /// Reject the message: append a DLQ record and remove from pending.
    pub async fn reject(&self, reason: &str) {
        if !self.claim_resolution() {
            return;
        }
        if let Some((envelope, consumer)) = self.0.topic.reject(&self.0.group, self.0.offset) {
            let record = build_dlq_record(
                &self.0.topic_name,
                &envelope,
                reason,
                &consumer,
                current_rfc3339(),
                uuid::Uuid::new_v4().simple().to_string(),
            );
            self.0.dlq_topic.append(record);
        }
        self.0.metrics.record_rejected();
        self.0.gate.mark_resolved();
    }

    pub fn envelope(&self) -> &Envelope {
        &self.0.envelope
    }

    pub fn consumer(&self) -> &str {
        &self.0.consumer
    }
}

impl Drop for Inner {
    /// A handler that returns without calling `ack`/`nack`/`reject`
    /// abandons the message; per §4.2.2 it MUST still be redelivered, so
    /// dropping the last handle for an unresolved delivery requeues it the
    /// same way an explicit `nack()` would. This is the in-memory stand-in
    /// for a broker's visibility timeout (§4.2.5's `(timeout) →
    /// PENDING_REDELIVERY` transition).
    fn drop(&mut self) {
        if !*self.resolved.get_mut() {
            self.topic.nack(&self.group, self.offset);
            self.gate.mark_resolved();
        }
    }
}

pub(crate) fn current_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
