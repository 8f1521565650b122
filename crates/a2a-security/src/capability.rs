//! Capability tokens: §4.4.2. Short-lived delegations carrying a single
//! scope-shaped grant, signed with the same algorithm family as bearer
//! tokens.

use crate::error::{SecurityError, SecurityResult};
use crate::scope::has_scope;
use crate::token::{TokenConfig, TokenKey};
use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityToken {
    pub grant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<HashMap<String, Value>>,
    pub exp: i64,
}

impl CapabilityToken {
    /// Whether this token's `grant` scope covers `required`, per the same
    /// matching rules as bearer scopes.
    pub fn grants(&self, required: &str) -> bool {
        has_scope(&[self.grant.as_str()], required)
    }

    /// Narrows the grant to a single resource id when `resource` is set.
    pub fn covers_resource(&self, resource_id: &str) -> bool {
        match &self.resource {
            Some(r) => r == resource_id,
            None => true,
        }
    }

    /// Cheap pre-filter the policy gate can consult before the
    /// out-of-process RPC: does this token's opaque `constraints` map allow
    /// `resource`? Absent constraints always allow; a `"deny_resources"`
    /// array entry matching `resource` denies.
    pub fn constraints_allow(&self, resource: &str) -> bool {
        let Some(constraints) = &self.constraints else {
            return true;
        };
        match constraints.get("deny_resources").and_then(Value::as_array) {
            Some(denied) => !denied.iter().any(|v| v.as_str() == Some(resource)),
            None => true,
        }
    }
}

/// Verify a capability token against `config`'s key, returning the decoded
/// token on success.
pub fn verify(token: &str, config: &TokenConfig) -> SecurityResult<CapabilityToken> {
    let (decoding_key, algorithm) = match &config.key {
        TokenKey::Hs256 { secret } => (DecodingKey::from_secret(secret), Algorithm::HS256),
        TokenKey::Rs256 { public_key_pem } => (
            DecodingKey::from_rsa_pem(public_key_pem)
                .map_err(|e| SecurityError::JwtInvalid(format!("invalid RSA key: {e}")))?,
            Algorithm::RS256,
        ),
    };

    let mut validation = Validation::new(algorithm);
    validation.leeway = config.leeway_seconds;
    validation.validate_exp = true;
    validation.validate_aud = false;

    let decoded: TokenData<CapabilityToken> = decode(token, &decoding_key, &validation).map_err(|e| {
        use jsonwebtoken::errors::ErrorKind;
        match e.kind() {
            ErrorKind::ExpiredSignature => SecurityError::JwtExpired,
            ErrorKind::InvalidSignature => SecurityError::JwtSignature,
            _ => SecurityError::JwtInvalid(e.to_string()),
        }
    })?;

    if decoded.claims.grant.trim().is_empty() {
        return Err(SecurityError::JwtInvalidClaims("grant must be non-empty".to_string()));
    }

    Ok(decoded.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "a-test-secret-that-is-long-enough";

    fn token_for(c: &CapabilityToken) -> String {
        encode(&Header::default(), c, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    #[test]
    fn grants_matches_prefix_wildcard() {
        let c = CapabilityToken {
            grant: "registry:*".into(),
            resource: None,
            constraints: None,
            exp: chrono::Utc::now().timestamp() + 60,
        };
        assert!(c.grants("registry:write"));
        assert!(!c.grants("policy:read"));
    }

    #[test]
    fn covers_resource_narrows_to_single_id() {
        let c = CapabilityToken {
            grant: "task:*".into(),
            resource: Some("task-42".into()),
            constraints: None,
            exp: 0,
        };
        assert!(c.covers_resource("task-42"));
        assert!(!c.covers_resource("task-43"));
    }

    #[test]
    fn constraints_deny_resources_blocks_match() {
        let mut constraints = HashMap::new();
        constraints.insert(
            "deny_resources".to_string(),
            serde_json::json!(["blocked-1"]),
        );
        let c = CapabilityToken {
            grant: "task:*".into(),
            resource: None,
            constraints: Some(constraints),
            exp: 0,
        };
        assert!(!c.constraints_allow("blocked-1"));
        assert!(c.constraints_allow("other"));
    }

    #[test]
    fn verify_round_trips_and_rejects_expired() {
        let valid = CapabilityToken {
            grant: "task:execute".into(),
            resource: None,
            constraints: None,
            exp: chrono::Utc::now().timestamp() + 60,
        };
        let token = token_for(&valid);
        let decoded = verify(&token, &TokenConfig::hs256(SECRET)).unwrap();
        assert_eq!(decoded.grant, "task:execute");

        let expired = CapabilityToken {
            grant: "task:execute".into(),
            resource: None,
            constraints: None,
            exp: chrono::Utc::now().timestamp() - 60,
        };
        let token = token_for(&expired);
        let err = verify(&token, &TokenConfig::hs256(SECRET)).unwrap_err();
        assert_eq!(err.code(), "E_JWT_EXPIRED");
    }
}
