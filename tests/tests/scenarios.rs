//! End-to-end scenarios S1-S8, wiring multiple fabric crates together in
//! the same way a real sender/receiver pair would.

use a2a_registry::{AgentStatus, DiscoverFilters, InMemoryRegistryStore, Registration, RegistryConfig, Registry};
use a2a_security::{
    check_replay_protection, generate_idempotency_key, signing, ReplayConfig, SigningAlgorithm,
};
use a2a_transport::{SubscribeOptions, Transport, TransportConfig};
use a2a_types::payload::{Payload, TaskRequest};
use a2a_types::{validate, AgentIdentity, Envelope, Recipient, ValidationConfig};
use chrono::TimeDelta;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn task_request_envelope(to_empty: bool) -> Envelope {
    let to = if to_empty {
        Vec::new()
    } else {
        vec![Recipient::direct("agent-2", "specialist", "1")]
    };
    Envelope::new(
        "a".repeat(32),
        "trace-s1",
        now_rfc3339(),
        AgentIdentity::new("agent-1", "coordinator", "1"),
        to,
        "wesign",
        "proj-1",
        Payload::TaskRequest(TaskRequest { task: "review".to_string(), inputs: serde_json::json!({}) }),
    )
}

/// S1 — Envelope validation.
#[test]
fn s1_envelope_validation() {
    let valid = task_request_envelope(false);
    let outcome = validate(&valid, &ValidationConfig::default());
    assert!(outcome.valid);

    let invalid = task_request_envelope(true);
    let outcome = validate(&invalid, &ValidationConfig::default());
    assert!(!outcome.valid);
    assert!(outcome.errors.iter().any(|e| e.reason == "E_VALIDATION_FAILED" || e.path.contains("to")));
}

/// S2 — At-least-once redelivery: handler ignores the first delivery,
/// acks the second.
#[tokio::test]
async fn s2_at_least_once_redelivery() {
    let transport = Transport::new(TransportConfig::default());
    let envelope = task_request_envelope(false);
    let message_id = envelope.meta.message_id.clone();
    transport.publish("wesign.proj-1.task.review.request", envelope, None).unwrap();

    let invocations = Arc::new(AtomicU32::new(0));
    let seen_ids = Arc::new(std::sync::Mutex::new(Vec::new()));
    let invocations_clone = invocations.clone();
    let seen_ids_clone = seen_ids.clone();

    let subscription = transport.subscribe(
        "wesign.proj-1.task.review.request",
        move |envelope, ack| {
            let invocations = invocations_clone.clone();
            let seen_ids = seen_ids_clone.clone();
            async move {
                let count = invocations.fetch_add(1, Ordering::SeqCst);
                seen_ids.lock().unwrap().push(envelope.meta.message_id.clone());
                if count >= 1 {
                    ack.ack().await;
                }
                // First delivery: drop the handle without acking, forcing redelivery.
            }
        },
        SubscribeOptions::new("reviewers", "reviewer-1"),
    );

    tokio::time::sleep(Duration::from_millis(200)).await;
    subscription.unsubscribe().await;

    assert!(invocations.load(Ordering::SeqCst) >= 2);
    assert!(seen_ids.lock().unwrap().iter().all(|id| id == &message_id));
}

/// S3 — DLQ on reject.
#[tokio::test]
async fn s3_dlq_on_reject() {
    let transport = Transport::new(TransportConfig::default());
    let topic = "wesign.proj-1.task.review.request";
    let envelope = task_request_envelope(false);
    transport.publish(topic, envelope, None).unwrap();

    let subscription = transport.subscribe(
        topic,
        |_envelope, ack| async move {
            ack.reject("bad").await;
        },
        SubscribeOptions::new("reviewers", "reviewer-1"),
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    subscription.unsubscribe().await;

    let dlq_subscription = transport.subscribe(
        &a2a_transport::dlq_topic_name(topic),
        move |envelope, ack| async move {
            if let Payload::SystemEvent(event) = &envelope.payload {
                assert_eq!(event.details.get("reason").and_then(|v| v.as_str()), Some("bad"));
            } else {
                panic!("expected a SystemEvent DLQ record");
            }
            ack.ack().await;
        },
        SubscribeOptions::new("dlq-drainers", "drainer-1"),
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    dlq_subscription.unsubscribe().await;
}

/// S4 — Idempotent deduplication: the same `idempotency_key` published
/// three times is handled exactly once.
#[tokio::test]
async fn s4_idempotent_deduplication() {
    use a2a_security::InMemoryIdempotencyStore;
    use a2a_transport::IdempotencyChecker;

    let store = Arc::new(InMemoryIdempotencyStore::new(Duration::from_secs(60)));
    let checker_store = store.clone();
    let checker: IdempotencyChecker = Arc::new(move |envelope: Envelope| {
        let store = checker_store.clone();
        Box::pin(async move {
            let key = envelope.meta.idempotency_key.clone().unwrap_or_default();
            !store.check_and_record(&key, chrono::Utc::now())
        })
    });

    let transport = Transport::new(TransportConfig::default());
    let topic = "wesign.proj-1.task.review.request";

    for _ in 0..3 {
        let mut envelope = task_request_envelope(false);
        envelope.meta.idempotency_key = Some("k-1".to_string());
        transport.publish(topic, envelope, None).unwrap();
    }

    let invocations = Arc::new(AtomicU32::new(0));
    let invocations_clone = invocations.clone();

    let subscription = transport.subscribe(
        topic,
        move |_envelope, ack| {
            let invocations = invocations_clone.clone();
            async move {
                invocations.fetch_add(1, Ordering::SeqCst);
                ack.ack().await;
            }
        },
        SubscribeOptions::new("reviewers", "reviewer-1").with_checker(checker),
    );

    tokio::time::sleep(Duration::from_millis(150)).await;
    subscription.unsubscribe().await;

    assert_eq!(invocations.load(Ordering::SeqCst), 1);
}

/// S5 — Lease expiry.
///
/// Uses a real (unpaused) sleep rather than `tokio::time::advance`: the
/// registry derives "now" from the wall clock (`chrono::Utc::now()`),
/// which tokio's virtual clock does not move, so the lease needs real
/// elapsed time to actually age past its `lease_until`.
#[tokio::test]
async fn s5_lease_expiry() {
    let registry = Registry::new(Arc::new(InMemoryRegistryStore::new()), RegistryConfig::default());
    registry
        .register(Registration::new("a", "1", "wesign", "proj-1").with_lease_duration(Duration::from_millis(30)))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(60)).await;

    let expired = registry.mark_expired_agents().await.unwrap();
    assert_eq!(expired, 1);

    let result = registry.discover(DiscoverFilters::new().with_agent_id("a").with_status(AgentStatus::Unavailable)).await.unwrap();
    assert_eq!(result.agents[0].status, AgentStatus::Unavailable);
}

/// S6 — Discovery filter AND.
#[tokio::test]
async fn s6_discovery_filter_and() {
    let registry = Registry::new(Arc::new(InMemoryRegistryStore::new()), RegistryConfig::default());

    registry
        .register(
            Registration::new("a1", "1", "wesign", "proj-1")
                .with_capabilities(["self-healing".to_string()])
                .with_status(AgentStatus::Healthy),
        )
        .await
        .unwrap();
    registry
        .register(
            Registration::new("a2", "1", "wesign", "proj-2")
                .with_capabilities(["self-healing".to_string()])
                .with_status(AgentStatus::Healthy),
        )
        .await
        .unwrap();
    registry
        .register(
            Registration::new("a3", "1", "other-tenant", "proj-1")
                .with_capabilities(["self-healing".to_string()])
                .with_status(AgentStatus::Healthy),
        )
        .await
        .unwrap();

    let result = registry
        .discover(DiscoverFilters::new().with_capability("self-healing").with_tenant("wesign"))
        .await
        .unwrap();

    assert_eq!(result.agents.len(), 2);
    assert!(result.agents.iter().all(|a| a.tenant == "wesign"));
}

/// S7 — Replay rejection.
#[test]
fn s7_replay_rejection() {
    let now = chrono::Utc::now();
    let config = ReplayConfig::default().with_max_past_age(Duration::from_secs(300));

    let stale = now - TimeDelta::seconds(301);
    let err = check_replay_protection(stale, now, &config).unwrap_err();
    assert_eq!(err.code(), "E_REPLAY_TIMESTAMP_STALE");

    let future = now + TimeDelta::seconds(60);
    let err = check_replay_protection(future, now, &config).unwrap_err();
    assert_eq!(err.code(), "E_REPLAY_TIMESTAMP_FUTURE");
}

/// S8 — Signature tamper detection.
#[test]
fn s8_signature_tamper_detection() {
    let mut envelope = task_request_envelope(false);
    let secret = b"demo-signing-secret";

    let value = serde_json::to_value(&envelope).unwrap();
    let signature = signing::sign(&value, SigningAlgorithm::HmacSha256, secret).unwrap();

    if let Payload::TaskRequest(task_request) = &mut envelope.payload {
        task_request.task = "tampered".to_string();
    }

    let tampered_value = serde_json::to_value(&envelope).unwrap();
    let err = signing::verify(&tampered_value, &signature, SigningAlgorithm::HmacSha256, secret).unwrap_err();
    assert_eq!(err.code(), "E_SIGNATURE_MISMATCH");
}

/// Testable property 3: idempotency key stability, exercised against the
/// receiver-side derivation used when no `idempotency_key` is supplied.
#[test]
fn idempotency_key_stable_and_sensitive_to_each_input() {
    let a = generate_idempotency_key("m-1", "t-1", "2026-01-01T00:00:00.000Z", "agent-1");
    let b = generate_idempotency_key("m-1", "t-1", "2026-01-01T00:00:00.000Z", "agent-1");
    assert_eq!(a, b);

    let different_trace = generate_idempotency_key("m-1", "t-2", "2026-01-01T00:00:00.000Z", "agent-1");
    assert_ne!(a, different_trace);
}
