//! Wire shapes for the policy engine's HTTP contract: §6.

use serde::{Deserialize, Serialize};

/// The body POSTed to `<baseUrl>/v1/data/<policy_path>`.
#[derive(Debug, Serialize)]
pub(crate) struct EngineRequest<'a> {
    pub input: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EngineResponse {
    pub result: Option<EngineResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EngineResult {
    pub allow: Option<bool>,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// The outcome of a pre-send or post-receive check.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDecision {
    pub allow: bool,
    pub reasons: Vec<String>,
}
