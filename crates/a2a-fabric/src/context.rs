//! `FabricContext`: the root lifecycle object.
//!
//! Wires transport, registry, security, and policy together explicitly —
//! no globals, no implicit wiring. A `FabricContext` owns the pieces a
//! sender or receiver needs to move one envelope through the full pipeline
//! described in §2: sign → pre-send policy gate → publish, and
//! post-receive policy gate → verify signature → replay check →
//! idempotency check on the receive side.

use crate::config::FabricConfig;
use crate::error::{FabricError, FabricResult};
use a2a_policy::PolicyGate;
use a2a_registry::{Registry, RegistryStore};
use a2a_security::{
    check_replay_protection, generate_idempotency_key, signing, IdempotencyStore, InMemoryIdempotencyStore,
    SecurityConfig, SecurityMetrics,
};
use a2a_types::Envelope;
use a2a_transport::Transport;
use std::sync::Arc;

/// Owns one instance each of the transport, registry, policy gate, and the
/// security config/idempotency store, and exposes the pipeline operations
/// that move an envelope across them. Cheaply `Clone`able.
#[derive(Clone)]
pub struct FabricContext {
    transport: Transport,
    registry: Registry,
    policy: Arc<PolicyGate>,
    security: Arc<SecurityConfig>,
    security_metrics: Arc<SecurityMetrics>,
    idempotency_store: Arc<dyn IdempotencyStore>,
}

impl FabricContext {
    pub fn new(config: FabricConfig, registry_store: Arc<dyn RegistryStore>) -> Self {
        let idempotency_ttl = config.security.idempotency_ttl;
        Self {
            transport: Transport::new(config.transport),
            registry: Registry::new(registry_store, config.registry),
            policy: Arc::new(PolicyGate::new(config.policy)),
            security: Arc::new(config.security),
            security_metrics: Arc::new(SecurityMetrics::default()),
            idempotency_store: Arc::new(InMemoryIdempotencyStore::new(idempotency_ttl)),
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn policy(&self) -> &PolicyGate {
        &self.policy
    }

    pub fn security(&self) -> &SecurityConfig {
        &self.security
    }

    pub fn security_metrics(&self) -> &Arc<SecurityMetrics> {
        &self.security_metrics
    }

    /// Signs `envelope` with the fabric's configured signing secret,
    /// returning the hex signature. Callers attach it however their wire
    /// transport convention dictates (typically `meta.metadata["signature"]`).
    pub fn sign_envelope(&self, envelope: &Envelope) -> FabricResult<String> {
        let value = serde_json::to_value(envelope)
            .map_err(|e| FabricError::Config(format!("envelope did not serialize: {e}")))?;
        signing::sign(&value, self.security.signing_algorithm, &self.security.signing_secret).map_err(FabricError::from)
    }

    /// Verifies `signature` against `envelope` under the fabric's signing
    /// secret.
    pub fn verify_envelope_signature(&self, envelope: &Envelope, signature: &str) -> FabricResult<()> {
        let value = serde_json::to_value(envelope)
            .map_err(|e| FabricError::Config(format!("envelope did not serialize: {e}")))?;
        let result = signing::verify(&value, signature, self.security.signing_algorithm, &self.security.signing_secret);
        match result {
            Ok(()) => {
                self.security_metrics.record_signature_verified();
                Ok(())
            }
            Err(err) => {
                self.security_metrics.record_signature_rejected();
                Err(FabricError::from(err))
            }
        }
    }

    /// Runs replay protection over `envelope.meta.ts` against the wall
    /// clock, per §4.4.4.
    pub fn check_replay(&self, envelope: &Envelope) -> FabricResult<()> {
        let ts = chrono::DateTime::parse_from_rfc3339(&envelope.meta.ts)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| FabricError::Config(format!("envelope.meta.ts is not RFC3339: {e}")))?;
        let result = check_replay_protection(ts, chrono::Utc::now(), &self.security.replay);
        if result.is_err() {
            self.security_metrics.record_replay_rejected();
        }
        result.map_err(FabricError::from)
    }

    /// Resolves the idempotency key for `envelope` (sender-supplied or
    /// derived), and records it as seen. Returns `true` if this is a
    /// duplicate the caller should silently ack rather than process, per
    /// the `E_DUPLICATE` propagation rule in §7.
    pub fn check_idempotent_duplicate(&self, envelope: &Envelope) -> bool {
        let key = envelope.meta.idempotency_key.clone().unwrap_or_else(|| {
            generate_idempotency_key(
                &envelope.meta.message_id,
                &envelope.meta.trace_id,
                &envelope.meta.ts,
                &envelope.meta.from.id,
            )
        });
        let first_time = self.idempotency_store.check_and_record(&key, chrono::Utc::now());
        if !first_time {
            self.security_metrics.record_duplicate_rejected();
        }
        !first_time
    }
}
