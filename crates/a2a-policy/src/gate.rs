//! The policy gate itself: §4.5.
//!
//! Mirrors the provider-client shape used elsewhere in the ecosystem for
//! thin out-of-process HTTP integrations: a `reqwest::Client` built once at
//! construction with a fixed timeout, a typed request/response pair, and a
//! `map_error` that sorts transport failures from application-level
//! outcomes.

use crate::config::PolicyConfig;
use crate::decision::{EngineRequest, EngineResponse, PolicyDecision};
use crate::error::{PolicyError, PolicyResult};
use crate::metrics::PolicyMetrics;
use serde_json::Value;
use std::sync::Arc;

/// A client for the out-of-process policy engine, consulted pre-send and
/// post-receive per §4.5. Failure mode is closed: if the engine cannot be
/// reached, every check denies unless `config.disabled` bypasses it
/// entirely.
pub struct PolicyGate {
    client: reqwest::Client,
    config: PolicyConfig,
    metrics: Arc<PolicyMetrics>,
}

impl PolicyGate {
    pub fn new(config: PolicyConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build policy engine HTTP client");

        Self { client, config, metrics: Arc::new(PolicyMetrics::default()) }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<PolicyMetrics> {
        &self.metrics
    }

    /// Pre-send check: called by the sender before `publish`.
    pub async fn check_pre_send(&self, trace_id: &str, envelope: &Value) -> PolicyResult<PolicyDecision> {
        self.check(trace_id, "pre_send", envelope).await
    }

    /// Post-receive check: called after token verification and before the
    /// handler runs. `claims` carries the verified bearer claims as JSON.
    pub async fn check_post_receive(
        &self,
        trace_id: &str,
        envelope: &Value,
        claims: &Value,
    ) -> PolicyResult<PolicyDecision> {
        let input = serde_json::json!({ "envelope": envelope, "claims": claims });
        self.check(trace_id, "post_receive", &input).await
    }

    async fn check(&self, trace_id: &str, stage: &str, input: &Value) -> PolicyResult<PolicyDecision> {
        if self.config.disabled {
            self.metrics.record_bypassed();
            tracing::debug!(trace_id, stage, "policy gate disabled, bypassing");
            return Ok(PolicyDecision { allow: true, reasons: Vec::new() });
        }

        let body = EngineRequest { input };
        let response = self
            .client
            .post(self.config.endpoint())
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(resp) => resp,
            Err(err) => {
                self.metrics.record_unavailable();
                tracing::warn!(trace_id, stage, error = %err, "policy engine unreachable");
                return Err(PolicyError::Unavailable(err.to_string()));
            }
        };

        if !response.status().is_success() {
            self.metrics.record_unavailable();
            let status = response.status();
            tracing::warn!(trace_id, stage, %status, "policy engine returned non-success status");
            return Err(PolicyError::Unavailable(format!("engine returned status {status}")));
        }

        let parsed: Result<EngineResponse, _> = response.json().await;
        let decision = match parsed {
            Ok(EngineResponse { result: Some(result) }) => match result.allow {
                Some(allow) => PolicyDecision { allow, reasons: result.reasons },
                None => PolicyDecision { allow: false, reasons: vec!["malformed_policy_response".to_string()] },
            },
            Ok(EngineResponse { result: None }) | Err(_) => {
                PolicyDecision { allow: false, reasons: vec!["malformed_policy_response".to_string()] }
            }
        };

        if decision.allow {
            self.metrics.record_allowed();
            tracing::info!(trace_id, stage, allow = true, "policy decision");
            Ok(decision)
        } else {
            self.metrics.record_denied();
            tracing::info!(trace_id, stage, allow = false, reasons = ?decision.reasons, "policy decision");
            Err(PolicyError::Deny(decision.reasons))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_gate_always_allows_without_network() {
        let gate = PolicyGate::new(PolicyConfig::disabled());
        let envelope = serde_json::json!({"meta": {"message_id": "m-1"}});
        let decision = gate.check_pre_send("trace-1", &envelope).await.unwrap();
        assert!(decision.allow);
        assert_eq!(gate.metrics().snapshot().bypassed, 1);
    }

    #[tokio::test]
    async fn unreachable_engine_is_treated_as_deny() {
        // No server listening on this port; connection fails immediately.
        let config = PolicyConfig::new("http://127.0.0.1:1", "a2a/wire_gates")
            .with_timeout(std::time::Duration::from_millis(200));
        let gate = PolicyGate::new(config);
        let envelope = serde_json::json!({"meta": {"message_id": "m-1"}});
        let err = gate.check_pre_send("trace-1", &envelope).await.unwrap_err();
        assert_eq!(err.code(), "E_POLICY_UNAVAILABLE");
        assert_eq!(gate.metrics().snapshot().unavailable, 1);
    }
}
