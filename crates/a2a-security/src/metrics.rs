//! Atomic counters for the security layer, mirroring the snapshot pattern
//! used by the transport and registry metrics.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct SecurityMetrics {
    bearer_verified: AtomicU64,
    bearer_rejected: AtomicU64,
    capability_verified: AtomicU64,
    capability_rejected: AtomicU64,
    signatures_verified: AtomicU64,
    signatures_rejected: AtomicU64,
    replay_rejected: AtomicU64,
    duplicates_rejected: AtomicU64,
}

impl SecurityMetrics {
    pub fn record_bearer_verified(&self) {
        self.bearer_verified.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bearer_rejected(&self) {
        self.bearer_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_capability_verified(&self) {
        self.capability_verified.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_capability_rejected(&self) {
        self.capability_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_signature_verified(&self) {
        self.signatures_verified.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_signature_rejected(&self) {
        self.signatures_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_replay_rejected(&self) {
        self.replay_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate_rejected(&self) {
        self.duplicates_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bearer_verified: self.bearer_verified.load(Ordering::Relaxed),
            bearer_rejected: self.bearer_rejected.load(Ordering::Relaxed),
            capability_verified: self.capability_verified.load(Ordering::Relaxed),
            capability_rejected: self.capability_rejected.load(Ordering::Relaxed),
            signatures_verified: self.signatures_verified.load(Ordering::Relaxed),
            signatures_rejected: self.signatures_rejected.load(Ordering::Relaxed),
            replay_rejected: self.replay_rejected.load(Ordering::Relaxed),
            duplicates_rejected: self.duplicates_rejected.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub bearer_verified: u64,
    pub bearer_rejected: u64,
    pub capability_verified: u64,
    pub capability_rejected: u64,
    pub signatures_verified: u64,
    pub signatures_rejected: u64,
    pub replay_rejected: u64,
    pub duplicates_rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = SecurityMetrics::default();
        metrics.record_bearer_verified();
        metrics.record_bearer_verified();
        metrics.record_bearer_rejected();
        metrics.record_replay_rejected();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.bearer_verified, 2);
        assert_eq!(snapshot.bearer_rejected, 1);
        assert_eq!(snapshot.replay_rejected, 1);
        assert_eq!(snapshot.capability_verified, 0);
    }
}
