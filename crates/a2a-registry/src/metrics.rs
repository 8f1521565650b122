//! Lock-free registry metrics, mirroring `a2a_transport::TransportMetrics`.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

const ORD: Ordering = Ordering::Relaxed;

#[derive(Debug, Default)]
pub struct RegistryMetrics {
    registrations: AtomicU64,
    heartbeats: AtomicU64,
    heartbeat_not_found: AtomicU64,
    discoveries: AtomicU64,
    sweeps: AtomicU64,
    expired_total: AtomicU64,
}

impl RegistryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_registration(&self) {
        self.registrations.fetch_add(1, ORD);
    }
    pub(crate) fn record_heartbeat(&self) {
        self.heartbeats.fetch_add(1, ORD);
    }
    pub(crate) fn record_heartbeat_not_found(&self) {
        self.heartbeat_not_found.fetch_add(1, ORD);
    }
    pub(crate) fn record_discovery(&self) {
        self.discoveries.fetch_add(1, ORD);
    }
    pub(crate) fn record_sweep(&self, expired: u64) {
        self.sweeps.fetch_add(1, ORD);
        self.expired_total.fetch_add(expired, ORD);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            registrations: self.registrations.load(ORD),
            heartbeats: self.heartbeats.load(ORD),
            heartbeat_not_found: self.heartbeat_not_found.load(ORD),
            discoveries: self.discoveries.load(ORD),
            sweeps: self.sweeps.load(ORD),
            expired_total: self.expired_total.load(ORD),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub registrations: u64,
    pub heartbeats: u64,
    pub heartbeat_not_found: u64,
    pub discoveries: u64,
    pub sweeps: u64,
    pub expired_total: u64,
}
