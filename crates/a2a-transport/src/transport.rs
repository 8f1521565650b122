//! The durable streaming transport: named topics, consumer groups, explicit
//! ack/nack/reject, DLQ, backpressure, and an idempotency hook.

use crate::ack::{current_rfc3339, AckHandle};
use crate::backpressure::PendingGate;
use crate::config::{SubscribeOptions, TransportConfig};
use crate::dlq::{build_dlq_record, dlq_topic_name, REASON_MAX_REDELIVERIES, REASON_SCHEMA_INVALID};
use crate::error::{TransportError, TransportResult};
use crate::metrics::{MetricsSnapshot, TransportMetrics};
use crate::subscription::Subscription;
use crate::topic::{Claim, Topic};
use a2a_types::Envelope;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct Inner {
    topics: DashMap<String, Arc<Topic>>,
    config: TransportConfig,
    metrics: Arc<TransportMetrics>,
}

/// Durable append-only topic transport. Cheaply `Clone`able; clones share
/// the same underlying topics and metrics.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<Inner>,
}

impl Transport {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                topics: DashMap::new(),
                config,
                metrics: Arc::new(TransportMetrics::new()),
            }),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    fn get_or_create_topic(&self, name: &str) -> Arc<Topic> {
        self.inner
            .topics
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Topic::new(name)))
            .clone()
    }

    /// Durably append `envelope` to `topic`. `partition_key` is accepted for
    /// forward compatibility with sharded backends; this in-memory
    /// implementation keeps one log per topic and does not use it to
    /// influence placement, since ordering across consumers in a group is
    /// unspecified anyway.
    pub fn publish(
        &self,
        topic: &str,
        envelope: Envelope,
        _partition_key: Option<&str>,
    ) -> TransportResult<String> {
        if self.inner.config.validate_on_publish {
            let outcome = a2a_types::validate(&envelope, &self.inner.config.validation);
            if !outcome.valid {
                self.inner.metrics.record_publish_error();
                tracing::warn!(
                    trace_id = %envelope.meta.trace_id,
                    topic,
                    errors = ?outcome.errors,
                    "rejecting publish: envelope failed validation"
                );
                return Err(TransportError::ValidationFailed(outcome.errors));
            }
        }
        let message_id = envelope.meta.message_id.clone();
        let topic = self.get_or_create_topic(topic);
        topic.append(envelope);
        self.inner.metrics.record_published();
        Ok(message_id)
    }

    /// Subscribe a handler to `topic` under the given consumer group and
    /// name. The transport creates the consumer group on first use.
    ///
    /// The fetch loop runs on its own task, claiming messages up to
    /// `options.backpressure.max_pending` in flight and dispatching each to
    /// its own task so a slow handler does not block claiming of the next
    /// message (up to the pending cap).
    pub fn subscribe<F, Fut>(&self, topic: &str, handler: F, options: SubscribeOptions) -> Subscription
    where
        F: Fn(Envelope, AckHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let topic_handle = self.get_or_create_topic(topic);
        let dlq_handle = self.get_or_create_topic(&dlq_topic_name(topic));
        let topic_name = topic.to_string();
        let group = options.consumer_group;
        let consumer = options.consumer_name;
        let checker = options.check_idempotency;
        let gate = Arc::new(PendingGate::new(options.backpressure));
        let config = self.inner.config.clone();
        let metrics = self.inner.metrics.clone();
        let handler = Arc::new(handler);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let mut in_flight = tokio::task::JoinSet::new();

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = gate.wait_for_capacity() => {}
                }
                if task_cancel.is_cancelled() {
                    break;
                }

                match topic_handle.claim(&group, &consumer, config.max_redeliveries) {
                    Claim::Empty => {
                        tokio::select! {
                            _ = task_cancel.cancelled() => break,
                            _ = tokio::time::sleep(Duration::from_millis(20)) => {}
                        }
                    }
                    Claim::ExceededRedeliveries { envelope, delivery_count, .. } => {
                        tracing::warn!(
                            trace_id = %envelope.meta.trace_id,
                            topic = %topic_name,
                            delivery_count,
                            "auto-rejecting to DLQ: redelivery ceiling exceeded"
                        );
                        let record = build_dlq_record(
                            &topic_name,
                            &envelope,
                            REASON_MAX_REDELIVERIES,
                            &consumer,
                            current_rfc3339(),
                            uuid::Uuid::new_v4().simple().to_string(),
                        );
                        dlq_handle.append(record);
                        metrics.record_dlq_auto_reject();
                    }
                    Claim::Delivered { offset, envelope, delivery_count } => {
                        gate.mark_claimed();
                        metrics.record_delivered();
                        if delivery_count > 1 {
                            metrics.record_redelivered();
                        }
                        let ack = AckHandle::new(
                            topic_handle.clone(),
                            topic_name.clone(),
                            dlq_handle.clone(),
                            group.clone(),
                            offset,
                            consumer.clone(),
                            envelope.clone(),
                            gate.clone(),
                            metrics.clone(),
                        );
                        let handler = handler.clone();
                        let checker = checker.clone();
                        let validate_on_subscribe = config.validate_on_subscribe;
                        let validation = config.validation;

                        in_flight.spawn(async move {
                            if validate_on_subscribe {
                                let outcome = a2a_types::validate(&envelope, &validation);
                                if !outcome.valid {
                                    ack.reject(REASON_SCHEMA_INVALID).await;
                                    return;
                                }
                            }
                            if let Some(checker) = checker {
                                if checker(envelope.clone()).await {
                                    ack.ack().await;
                                    return;
                                }
                            }
                            handler(envelope, ack).await;
                        });
                    }
                }

                while in_flight.try_join_next().is_some() {}
            }

            while in_flight.join_next().await.is_some() {}
        });

        Subscription { cancel, task }
    }

    /// Drain up to `max` dead-lettered envelopes from `<topic>:dlq`,
    /// acknowledging each as it is read. Tooling-facing: the DLQ is a
    /// regular topic and this just runs a dedicated consumer group over it.
    pub fn drain_dlq(&self, topic: &str, max: usize) -> Vec<Envelope> {
        let dlq_handle = self.get_or_create_topic(&dlq_topic_name(topic));
        let mut drained = Vec::with_capacity(max.min(16));
        for _ in 0..max {
            match dlq_handle.claim("dlq-drain", "tooling", u32::MAX) {
                Claim::Delivered { offset, envelope, .. } => {
                    dlq_handle.ack("dlq-drain", offset);
                    drained.push(envelope);
                }
                _ => break,
            }
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubscribeOptions;
    use a2a_types::{AgentIdentity, Payload, Recipient, TaskRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn request(n: usize) -> Envelope {
        Envelope::new(
            format!("{:032x}", n),
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

    #[tokio::test]
    async fn publish_then_subscribe_delivers_and_acks() {
        let transport = Transport::new(TransportConfig::default());
        transport.publish("topic.a", request(1), None).unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = seen.clone();
        let sub = transport.subscribe(
            "topic.a",
            move |_envelope, ack| {
                let seen = seen2.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    ack.ack().await;
                }
            },
            SubscribeOptions::new("group-1", "consumer-1"),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        sub.unsubscribe().await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(transport.metrics().acked, 1);
    }

    #[tokio::test]
    async fn nacked_message_is_redelivered() {
        let transport = Transport::new(TransportConfig::default());
        transport.publish("topic.b", request(1), None).unwrap();

        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts2 = attempts.clone();
        let sub = transport.subscribe(
            "topic.b",
            move |_envelope, ack| {
                let attempts = attempts2.clone();
                async move {
                    let n = attempts.fetch_add(1, Ordering::SeqCst);
                    if n == 0 {
                        ack.nack().await;
                    } else {
                        ack.ack().await;
                    }
                }
            },
            SubscribeOptions::new("group-1", "consumer-1"),
        );

        tokio::time::sleep(Duration::from_millis(150)).await;
        sub.unsubscribe().await;
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(transport.metrics().redelivered, 1); // counted when the nacked message is reclaimed, not when nacked
        assert_eq!(transport.metrics().nacked, 1);
        assert_eq!(transport.metrics().acked, 1);
    }

    #[tokio::test]
    async fn reject_writes_dlq_record() {
        let transport = Transport::new(TransportConfig::default());
        transport.publish("topic.c", request(1), None).unwrap();

        let sub = transport.subscribe(
            "topic.c",
            |_envelope, ack| async move {
                ack.reject("business_rule_violation").await;
            },
            SubscribeOptions::new("group-1", "consumer-1"),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        sub.unsubscribe().await;

        let dlq = transport.drain_dlq("topic.c", 10);
        assert_eq!(dlq.len(), 1);
        let Payload::SystemEvent(event) = &dlq[0].payload else { panic!() };
        assert_eq!(
            event.details.get("reason").and_then(|v| v.as_str()),
            Some("business_rule_violation")
        );
    }

    #[tokio::test]
    async fn exceeding_redelivery_ceiling_auto_rejects_to_dlq() {
        let mut config = TransportConfig::default();
        config.max_redeliveries = 1;
        let transport = Transport::new(config);
        transport.publish("topic.d", request(1), None).unwrap();

        let sub = transport.subscribe(
            "topic.d",
            |_envelope, ack| async move {
                ack.nack().await;
            },
            SubscribeOptions::new("group-1", "consumer-1"),
        );
        tokio::time::sleep(Duration::from_millis(150)).await;
        sub.unsubscribe().await;

        let dlq = transport.drain_dlq("topic.d", 10);
        assert_eq!(dlq.len(), 1);
        assert_eq!(transport.metrics().dlq_auto_rejected, 1);
    }

    #[tokio::test]
    async fn validate_on_publish_rejects_invalid_envelope() {
        let transport = Transport::new(TransportConfig::default());
        let mut bad = request(1);
        bad.meta.to.clear();
        let err = transport.publish("topic.e", bad, None).unwrap_err();
        assert_eq!(err.code(), "E_VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn idempotency_checker_skips_handler() {
        let transport = Transport::new(TransportConfig::default());
        transport.publish("topic.f", request(1), None).unwrap();

        let handler_calls = Arc::new(AtomicUsize::new(0));
        let handler_calls2 = handler_calls.clone();
        let checker: crate::config::IdempotencyChecker = Arc::new(|_env: Envelope| {
            Box::pin(async move { true })
        });

        let sub = transport.subscribe(
            "topic.f",
            move |_envelope, ack| {
                let handler_calls = handler_calls2.clone();
                async move {
                    handler_calls.fetch_add(1, Ordering::SeqCst);
                    ack.ack().await;
                }
            },
            SubscribeOptions::new("group-1", "consumer-1").with_checker(checker),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        sub.unsubscribe().await;

        assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
        assert_eq!(transport.metrics().acked, 1);
    }

    #[tokio::test]
    async fn separate_consumer_groups_each_receive_the_message() {
        let transport = Transport::new(TransportConfig::default());
        transport.publish("topic.g", request(1), None).unwrap();

        let seen_a = Arc::new(AtomicUsize::new(0));
        let seen_b = Arc::new(AtomicUsize::new(0));
        let (sa, sb) = (seen_a.clone(), seen_b.clone());

        let sub_a = transport.subscribe(
            "topic.g",
            move |_e, ack| {
                let seen = sa.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    ack.ack().await;
                }
            },
            SubscribeOptions::new("group-a", "c1"),
        );
        let sub_b = transport.subscribe(
            "topic.g",
            move |_e, ack| {
                let seen = sb.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    ack.ack().await;
                }
            },
            SubscribeOptions::new("group-b", "c1"),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        sub_a.unsubscribe().await;
        sub_b.unsubscribe().await;

        assert_eq!(seen_a.load(Ordering::SeqCst), 1);
        assert_eq!(seen_b.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn backpressure_gate_caps_in_flight_handlers() {
        let transport = Transport::new(TransportConfig::default());
        for i in 0..10 {
            transport.publish("topic.h", request(i), None).unwrap();
        }

        let max_concurrent = Arc::new(AtomicUsize::new(0));
        let current = Arc::new(AtomicUsize::new(0));
        let (m1, c1) = (max_concurrent.clone(), current.clone());

        let sub = transport.subscribe(
            "topic.h",
            move |_e, ack| {
                let max_concurrent = m1.clone();
                let current = c1.clone();
                async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    max_concurrent.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    ack.ack().await;
                }
            },
            SubscribeOptions::new("group-1", "c1").with_max_pending(2),
        );

        tokio::time::sleep(Duration::from_millis(500)).await;
        sub.unsubscribe().await;
        assert!(max_concurrent.load(Ordering::SeqCst) <= 2);
    }
}
