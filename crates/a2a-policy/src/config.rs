//! Policy gate configuration: §6 "Environment".

use std::time::Duration;

/// Options for the out-of-process policy engine client.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Base URL of the policy engine, e.g. `http://localhost:8181`.
    pub base_url: String,
    /// Policy path consulted for wire-level gates, e.g. `a2a/wire_gates`.
    pub policy_path: String,
    /// Request timeout; the contract requires ≤500 ms.
    pub timeout: Duration,
    /// When `true`, `check_pre_send`/`check_post_receive` always allow
    /// without contacting the engine.
    pub disabled: bool,
}

impl PolicyConfig {
    pub fn new(base_url: impl Into<String>, policy_path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            policy_path: policy_path.into(),
            timeout: Duration::from_millis(500),
            disabled: false,
        }
    }

    pub fn disabled() -> Self {
        Self {
            base_url: String::new(),
            policy_path: String::new(),
            timeout: Duration::from_millis(500),
            disabled: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/data/{}", self.base_url.trim_end_matches('/'), self.policy_path)
    }
}
