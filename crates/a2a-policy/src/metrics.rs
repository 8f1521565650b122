//! Atomic policy-decision counters, mirroring the transport/registry
//! metrics snapshot pattern.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct PolicyMetrics {
    allowed: AtomicU64,
    denied: AtomicU64,
    unavailable: AtomicU64,
    bypassed: AtomicU64,
}

impl PolicyMetrics {
    pub fn record_allowed(&self) {
        self.allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_denied(&self) {
        self.denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unavailable(&self) {
        self.unavailable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bypassed(&self) {
        self.bypassed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            allowed: self.allowed.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub allowed: u64,
    pub denied: u64,
    pub unavailable: u64,
    pub bypassed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = PolicyMetrics::default();
        metrics.record_allowed();
        metrics.record_denied();
        metrics.record_denied();
        metrics.record_unavailable();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.allowed, 1);
        assert_eq!(snapshot.denied, 2);
        assert_eq!(snapshot.unavailable, 1);
        assert_eq!(snapshot.bypassed, 0);
    }
}
