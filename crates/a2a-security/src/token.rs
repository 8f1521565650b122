//! Bearer token verification: §4.4.1.
//!
//! Modeled on the JWT validator pattern used elsewhere in the ecosystem
//! (decode + typed `Validation`), generalized to the two algorithm
//! families the contract names (HS256, RS256) and to the fabric's
//! required-claim shape (`sub`, `tenant`, `project`, `scopes`).

use crate::error::{SecurityError, SecurityResult};
use crate::scope::has_scope;
use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};

/// The key material and expected claims for one verifier.
#[derive(Clone)]
pub enum TokenKey {
    /// HMAC with SHA-256 (symmetric key).
    Hs256 { secret: Vec<u8> },
    /// RSA with SHA-256 (public key in PEM format).
    Rs256 { public_key_pem: Vec<u8> },
}

/// Options for [`verify`].
#[derive(Clone)]
pub struct TokenConfig {
    pub key: TokenKey,
    pub expected_issuer: Option<String>,
    pub expected_audience: Option<String>,
    /// Seconds of clock skew tolerated on `exp`/`nbf` checks.
    pub leeway_seconds: u64,
}

impl TokenConfig {
    pub fn hs256(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            key: TokenKey::Hs256 { secret: secret.into() },
            expected_issuer: None,
            expected_audience: None,
            leeway_seconds: 0,
        }
    }

    pub fn rs256(public_key_pem: impl Into<Vec<u8>>) -> Self {
        Self {
            key: TokenKey::Rs256 { public_key_pem: public_key_pem.into() },
            expected_issuer: None,
            expected_audience: None,
            leeway_seconds: 0,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.expected_issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.expected_audience = Some(audience.into());
        self
    }

    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway_seconds = seconds;
        self
    }
}

/// The required and optional claims named in §4.4.1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BearerClaims {
    pub sub: String,
    pub tenant: String,
    pub project: String,
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl BearerClaims {
    pub fn has_scope(&self, required: &str) -> bool {
        has_scope(&self.scopes, required)
    }
}

fn decoding_key(key: &TokenKey) -> SecurityResult<(DecodingKey, Algorithm)> {
    match key {
        TokenKey::Hs256 { secret } => Ok((DecodingKey::from_secret(secret), Algorithm::HS256)),
        TokenKey::Rs256 { public_key_pem } => DecodingKey::from_rsa_pem(public_key_pem)
            .map(|k| (k, Algorithm::RS256))
            .map_err(|e| SecurityError::JwtInvalid(format!("invalid RSA key: {e}"))),
    }
}

/// Verify `token` against `config`, returning the decoded claims on
/// success. Errors map to the exact taxonomy named in §4.4.1.
pub fn verify(token: &str, config: &TokenConfig) -> SecurityResult<BearerClaims> {
    let (decoding_key, algorithm) = decoding_key(&config.key)?;

    let mut validation = Validation::new(algorithm);
    validation.leeway = config.leeway_seconds;
    validation.validate_exp = true;
    validation.validate_nbf = true;
    if let Some(iss) = &config.expected_issuer {
        validation.set_issuer(&[iss]);
    }
    if let Some(aud) = &config.expected_audience {
        validation.set_audience(&[aud]);
    } else {
        validation.validate_aud = false;
    }

    let decoded: TokenData<BearerClaims> =
        decode(token, &decoding_key, &validation).map_err(|e| map_jwt_error(e))?;

    let claims = decoded.claims;
    if claims.sub.trim().is_empty() || claims.tenant.trim().is_empty() || claims.project.trim().is_empty() {
        return Err(SecurityError::JwtInvalidClaims(
            "sub, tenant, and project must be non-empty".to_string(),
        ));
    }

    Ok(claims)
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> SecurityError {
    use jsonwebtoken::errors::ErrorKind;
    match err.kind() {
        ErrorKind::ExpiredSignature => SecurityError::JwtExpired,
        ErrorKind::InvalidSignature => SecurityError::JwtSignature,
        ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience | ErrorKind::ImmatureSignature => {
            SecurityError::JwtInvalidClaims(err.to_string())
        }
        _ => SecurityError::JwtInvalid(err.to_string()),
    }
}
