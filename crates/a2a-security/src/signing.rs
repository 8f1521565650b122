//! Envelope signing: §4.4.3.
//!
//! Signatures are computed over a canonical serialization of the envelope
//! (object keys sorted recursively, no whitespace, with the `signature`
//! field itself excluded from the digest) using HMAC-SHA256 or
//! HMAC-SHA512.

use crate::error::{SecurityError, SecurityResult};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// Which HMAC digest to sign with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    HmacSha256,
    HmacSha512,
}

/// Render `value` as canonical JSON: object keys sorted recursively,
/// arrays preserved in order, no insignificant whitespace.
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key).expect("string keys always serialize"));
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}

/// Strip any `signature` field from an envelope JSON value before signing
/// or verification, so the signature never signs itself. Checked at the
/// envelope root, inside `meta`, and inside `meta.metadata` (the
/// conventional carrier, since the envelope contract's fixed `meta` fields
/// don't name a `signature` slot of their own).
fn without_signature(envelope: &Value) -> Value {
    let mut cloned = envelope.clone();
    if let Some(root) = cloned.as_object_mut() {
        root.remove("signature");
    }
    if let Some(meta) = cloned.get_mut("meta").and_then(Value::as_object_mut) {
        meta.remove("signature");
        if let Some(metadata) = meta.get_mut("metadata").and_then(Value::as_object_mut) {
            metadata.remove("signature");
        }
    }
    cloned
}

fn digest(algorithm: SigningAlgorithm, secret: &[u8], message: &str) -> SecurityResult<Vec<u8>> {
    match algorithm {
        SigningAlgorithm::HmacSha256 => {
            let mut mac = HmacSha256::new_from_slice(secret)
                .map_err(|e| SecurityError::JwtInvalid(format!("bad HMAC key: {e}")))?;
            mac.update(message.as_bytes());
            Ok(mac.finalize().into_bytes().to_vec())
        }
        SigningAlgorithm::HmacSha512 => {
            let mut mac = HmacSha512::new_from_slice(secret)
                .map_err(|e| SecurityError::JwtInvalid(format!("bad HMAC key: {e}")))?;
            mac.update(message.as_bytes());
            Ok(mac.finalize().into_bytes().to_vec())
        }
    }
}

/// Compute the hex-encoded signature for `envelope` (a JSON value),
/// excluding any existing `meta.signature` field from the digest.
pub fn sign(envelope: &Value, algorithm: SigningAlgorithm, secret: &[u8]) -> SecurityResult<String> {
    let canonical = canonicalize(&without_signature(envelope));
    let mac = digest(algorithm, secret, &canonical)?;
    Ok(hex::encode(mac))
}

/// Verify that `signature` (hex-encoded) matches `envelope` under `secret`.
/// Comparison is constant-time. Returns `Err(SignatureMismatch)` on
/// mismatch or malformed hex.
pub fn verify(
    envelope: &Value,
    signature: &str,
    algorithm: SigningAlgorithm,
    secret: &[u8],
) -> SecurityResult<()> {
    let expected = sign(envelope, algorithm, secret)?;
    let expected_bytes = hex::decode(&expected).map_err(|_| SecurityError::SignatureMismatch)?;
    let given_bytes = hex::decode(signature).map_err(|_| SecurityError::SignatureMismatch)?;

    if expected_bytes.ct_eq(&given_bytes).unwrap_u8() == 1 {
        Ok(())
    } else {
        Err(SecurityError::SignatureMismatch)
    }
}
