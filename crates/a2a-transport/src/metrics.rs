//! Lock-free transport metrics.
//!
//! All counters use [`AtomicU64`] with [`Ordering::Relaxed`]; these are
//! monotonic counters with no causal dependency on each other.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

const ORD: Ordering = Ordering::Relaxed;

/// Real-time, lock-free counters for a single [`crate::Transport`].
#[derive(Debug, Default)]
pub struct TransportMetrics {
    published: AtomicU64,
    delivered: AtomicU64,
    acked: AtomicU64,
    nacked: AtomicU64,
    rejected: AtomicU64,
    redelivered: AtomicU64,
    dlq_auto_rejected: AtomicU64,
    publish_errors: AtomicU64,
}

impl TransportMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_published(&self) {
        self.published.fetch_add(1, ORD);
    }
    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, ORD);
    }
    pub(crate) fn record_acked(&self) {
        self.acked.fetch_add(1, ORD);
    }
    pub(crate) fn record_nacked(&self) {
        self.nacked.fetch_add(1, ORD);
    }
    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, ORD);
    }
    pub(crate) fn record_redelivered(&self) {
        self.redelivered.fetch_add(1, ORD);
    }
    pub(crate) fn record_dlq_auto_reject(&self) {
        self.dlq_auto_rejected.fetch_add(1, ORD);
    }
    pub(crate) fn record_publish_error(&self) {
        self.publish_errors.fetch_add(1, ORD);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            published: self.published.load(ORD),
            delivered: self.delivered.load(ORD),
            acked: self.acked.load(ORD),
            nacked: self.nacked.load(ORD),
            rejected: self.rejected.load(ORD),
            redelivered: self.redelivered.load(ORD),
            dlq_auto_rejected: self.dlq_auto_rejected.load(ORD),
            publish_errors: self.publish_errors.load(ORD),
        }
    }
}

/// Serializable point-in-time view of [`TransportMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub published: u64,
    pub delivered: u64,
    pub acked: u64,
    pub nacked: u64,
    pub rejected: u64,
    pub redelivered: u64,
    pub dlq_auto_rejected: u64,
    pub publish_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let snap = TransportMetrics::new().snapshot();
        assert_eq!(snap.published, 0);
        assert_eq!(snap.acked, 0);
    }

    #[test]
    fn records_and_reads() {
        let m = TransportMetrics::new();
        m.record_published();
        m.record_published();
        m.record_delivered();
        m.record_acked();
        m.record_dlq_auto_reject();
        let snap = m.snapshot();
        assert_eq!(snap.published, 2);
        assert_eq!(snap.delivered, 1);
        assert_eq!(snap.acked, 1);
        assert_eq!(snap.dlq_auto_rejected, 1);
    }
}
