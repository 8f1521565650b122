//! Idempotency: §4.4.5. When an envelope carries no explicit
//! `meta.idempotency_key`, one is derived deterministically so that
//! redeliveries of the same logical message collapse to the same key.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Derive the fallback idempotency key: SHA-256 of
/// `message_id || trace_id || ts || from.id`.
pub fn generate_idempotency_key(message_id: &str, trace_id: &str, ts: &str, from_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(message_id.as_bytes());
    hasher.update(trace_id.as_bytes());
    hasher.update(ts.as_bytes());
    hasher.update(from_id.as_bytes());
    hex::encode(hasher.finalize())
}

/// Durable store of idempotency keys already seen, used to detect
/// duplicate deliveries across process restarts or multiple replicas.
/// Implementations decide their own persistence and eviction strategy;
/// [`InMemoryIdempotencyStore`] is the process-local reference
/// implementation used in tests and single-node deployments.
pub trait IdempotencyStore: Send + Sync {
    /// Records `key` as seen at `now`, returning `true` if this is the
    /// first time it has been observed (i.e. the caller should process the
    /// message) or `false` if it is a duplicate.
    fn check_and_record(&self, key: &str, now: DateTime<Utc>) -> bool;
}

struct Entry {
    seen_at: DateTime<Utc>,
}

/// An in-memory [`IdempotencyStore`] with a fixed TTL: keys older than
/// `ttl` are treated as expired and evicted lazily on access.
pub struct InMemoryIdempotencyStore {
    ttl: Duration,
    seen: Mutex<HashMap<String, Entry>>,
}

impl InMemoryIdempotencyStore {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, seen: Mutex::new(HashMap::new()) }
    }

    /// Removes entries older than `ttl` relative to `now`.
    pub fn evict_expired(&self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        let mut seen = self.seen.lock().expect("idempotency store mutex poisoned");
        seen.retain(|_, entry| {
            (now - entry.seen_at).to_std().map(|age| age <= ttl).unwrap_or(true)
        });
    }

    pub fn len(&self) -> usize {
        self.seen.lock().expect("idempotency store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdempotencyStore for InMemoryIdempotencyStore {
    fn check_and_record(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.evict_expired(now);
        let mut seen = self.seen.lock().expect("idempotency store mutex poisoned");
        if seen.contains_key(key) {
            return false;
        }
        seen.insert(key.to_string(), Entry { seen_at: now });
        true
    }
}
