//! Binary payload field encoding, per spec §6 ("External Interfaces"):
//! binary payload fields, when used, are base64-encoded strings on the
//! wire. Payload structs carry such fields as plain `String`s; this module
//! is the single place that does the encode/decode so every payload type
//! agrees on the same alphabet.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode raw bytes as the base64 string a payload field should carry.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a payload field back to raw bytes. Returns `None` on malformed
/// base64 rather than panicking — callers fold this into their own
/// validation error path.
pub fn decode(field: &str) -> Option<Vec<u8>> {
    STANDARD.decode(field).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let bytes = b"\x00\x01\xffhello\x00world";
        let encoded = encode(bytes);
        assert_eq!(decode(&encoded).unwrap(), bytes);
    }

    #[test]
    fn rejects_malformed_base64() {
        assert!(decode("not base64!!!").is_none());
    }
}
