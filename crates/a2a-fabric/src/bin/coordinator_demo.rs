//! Minimal coordinator/specialist demo wiring every layer together: an
//! agent registers, a coordinator signs and publishes a `TaskRequest`, a
//! specialist's subscription receives it, verifies it, and acks.
//!
//! Not a production entry point — a runnable illustration of the pipeline
//! described in §2 of the fabric contract.

use a2a_fabric::{FabricConfig, FabricContext};
use a2a_registry::{AgentStatus, InMemoryRegistryStore, Registration};
use a2a_transport::SubscribeOptions;
use a2a_types::{AgentIdentity, Envelope, Recipient};
use a2a_types::payload::{Payload, TaskRequest};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = FabricConfig::from_file_config(a2a_fabric::FabricFileConfig::default())
        .expect("default config is always valid");
    let ctx = FabricContext::new(config, Arc::new(InMemoryRegistryStore::new()));

    ctx.registry()
        .register(
            Registration::new("specialist-1", "1", "demo-tenant", "demo-project")
                .with_capabilities(["task-review".to_string()])
                .with_status(AgentStatus::Healthy),
        )
        .await
        .expect("registration should succeed against an in-memory store");

    let sweeper = a2a_fabric::health::start_lease_sweeper(&ctx);
    let heartbeat = a2a_fabric::health::start_heartbeat_publisher(
        &ctx,
        "specialist-1",
        Duration::from_secs(60),
        || Ok(AgentStatus::Healthy),
    );

    let topic = "demo-tenant.demo-project.task.review.request";
    let envelope = Envelope::new(
        "a".repeat(32),
        uuid::Uuid::new_v4().simple().to_string(),
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        AgentIdentity::new("coordinator-1", "coordinator", "1"),
        vec![Recipient::direct("specialist-1", "specialist", "1")],
        "demo-tenant",
        "demo-project",
        Payload::TaskRequest(TaskRequest { task: "review".to_string(), inputs: serde_json::json!({}) }),
    );

    let signature = ctx.sign_envelope(&envelope).expect("signing should succeed");
    tracing::info!(signature = %signature, "signed outbound envelope");

    match ctx.policy().check_pre_send(&envelope.meta.trace_id, &serde_json::to_value(&envelope).unwrap()).await {
        Ok(_) => {
            ctx.transport().publish(topic, envelope, None).expect("publish should succeed");
        }
        Err(err) => {
            tracing::warn!(error = %err, code = err.code(), "pre-send policy denied, not publishing");
        }
    }

    let subscription = ctx.transport().subscribe(
        topic,
        move |envelope, ack| async move {
            tracing::info!(message_id = %envelope.meta.message_id, "specialist received task request");
            ack.ack().await;
        },
        SubscribeOptions::new("specialists", "specialist-1"),
    );

    tokio::time::sleep(Duration::from_millis(100)).await;

    subscription.unsubscribe().await;
    sweeper.stop().await;
    heartbeat.stop().await;
}
