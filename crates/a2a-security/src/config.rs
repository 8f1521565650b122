//! Aggregated configuration for the security layer.

use crate::replay::ReplayConfig;
use crate::signing::SigningAlgorithm;
use crate::token::TokenConfig;
use std::time::Duration;

/// Everything the fabric needs to wire up wire-level trust: bearer/
/// capability token verification, envelope signing, and replay
/// protection.
#[derive(Clone)]
pub struct SecurityConfig {
    pub bearer: TokenConfig,
    pub capability: TokenConfig,
    pub signing_algorithm: SigningAlgorithm,
    pub signing_secret: Vec<u8>,
    pub replay: ReplayConfig,
    pub idempotency_ttl: Duration,
}

impl SecurityConfig {
    pub fn new(bearer: TokenConfig, capability: TokenConfig, signing_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            bearer,
            capability,
            signing_algorithm: SigningAlgorithm::HmacSha256,
            signing_secret: signing_secret.into(),
            replay: ReplayConfig::default(),
            idempotency_ttl: Duration::from_secs(300),
        }
    }

    pub fn with_signing_algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.signing_algorithm = algorithm;
        self
    }

    pub fn with_replay(mut self, replay: ReplayConfig) -> Self {
        self.replay = replay;
        self
    }

    pub fn with_idempotency_ttl(mut self, ttl: Duration) -> Self {
        self.idempotency_ttl = ttl;
        self
    }
}
