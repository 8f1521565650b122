//! The root `Registry` facade: wires a [`RegistryStore`] backend to the
//! wall clock, metrics, and structured logging.

use crate::agent::{AgentStatus, Lease, Registration};
use crate::config::RegistryConfig;
use crate::error::RegistryResult;
use crate::filters::{DiscoverFilters, DiscoverResult};
use crate::metrics::{MetricsSnapshot, RegistryMetrics};
use crate::store::RegistryStore;
use std::sync::Arc;
use std::time::Duration;

/// Authoritative, strongly-consistent directory of agents with leased
/// liveness (§4.3). Cheaply `Clone`able; clones share the same backend and
/// metrics.
#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn RegistryStore>,
    config: RegistryConfig,
    metrics: Arc<RegistryMetrics>,
}

impl Registry {
    pub fn new(store: Arc<dyn RegistryStore>, config: RegistryConfig) -> Self {
        Self {
            store,
            config,
            metrics: Arc::new(RegistryMetrics::new()),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub async fn register(&self, mut registration: Registration) -> RegistryResult<Lease> {
        if registration.lease_duration.is_none() {
            registration.lease_duration = Some(self.config.default_lease_duration);
        }
        let agent_id = registration.agent_id.clone();
        let result = self.store.register(registration, chrono::Utc::now()).await;
        match &result {
            Ok(lease) => {
                self.metrics.record_registration();
                tracing::info!(agent_id, lease_until = %lease.lease_until, "agent registered");
            }
            Err(err) => {
                tracing::warn!(agent_id, error = %err, code = err.code(), "registration failed");
            }
        }
        result
    }

    pub async fn heartbeat(
        &self,
        agent_id: &str,
        status: Option<AgentStatus>,
        lease_duration: Option<Duration>,
    ) -> RegistryResult<Lease> {
        let lease_duration = lease_duration.or(Some(self.config.default_lease_duration));
        let result = self
            .store
            .heartbeat(agent_id, status, lease_duration, chrono::Utc::now())
            .await;
        match &result {
            Ok(lease) => {
                self.metrics.record_heartbeat();
                tracing::debug!(agent_id, lease_until = %lease.lease_until, "heartbeat recorded");
            }
            Err(err) => {
                self.metrics.record_heartbeat_not_found();
                tracing::warn!(agent_id, error = %err, code = err.code(), "heartbeat failed");
            }
        }
        result
    }

    pub async fn discover(&self, filters: DiscoverFilters) -> RegistryResult<DiscoverResult> {
        self.metrics.record_discovery();
        self.store.discover(&filters, chrono::Utc::now()).await
    }

    /// Periodic lease-expiry sweep (§4.3.3). Safe to call from multiple
    /// replicas — the underlying update is idempotent.
    pub async fn mark_expired_agents(&self) -> RegistryResult<u64> {
        let count = self.store.mark_expired_agents(chrono::Utc::now()).await?;
        self.metrics.record_sweep(count);
        if count > 0 {
            tracing::info!(expired = count, "lease sweep marked agents unavailable");
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryRegistryStore;

    fn registry() -> Registry {
        Registry::new(Arc::new(InMemoryRegistryStore::new()), RegistryConfig::default())
    }

    #[tokio::test]
    async fn register_defaults_lease_duration_from_config() {
        let registry = registry();
        let lease = registry
            .register(Registration::new("a", "1", "t", "p"))
            .await
            .unwrap();
        assert!(lease.lease_until > chrono::Utc::now());
    }

    #[tokio::test]
    async fn heartbeat_on_unknown_agent_surfaces_not_found() {
        let registry = registry();
        let err = registry.heartbeat("ghost", None, None).await.unwrap_err();
        assert_eq!(err.code(), "E_AGENT_NOT_FOUND");
    }

    #[tokio::test]
    async fn metrics_track_registrations_and_sweeps() {
        let registry = registry();
        registry
            .register(Registration::new("a", "1", "t", "p").with_lease_duration(Duration::from_millis(1)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let expired = registry.mark_expired_agents().await.unwrap();
        assert_eq!(expired, 1);

        let snapshot = registry.metrics();
        assert_eq!(snapshot.registrations, 1);
        assert_eq!(snapshot.sweeps, 1);
        assert_eq!(snapshot.expired_total, 1);
    }
}
