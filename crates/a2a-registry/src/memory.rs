//! In-memory reference implementation of [`crate::store::RegistryStore`].
//!
//! Mirrors the in-memory `Topic` reference store in `a2a-transport`: a
//! single guarded map stands in for "any relational engine" satisfying the
//! backend contract, swappable behind the same trait for a real database.

use crate::agent::{AgentRecord, AgentStatus, Lease, Registration};
use crate::error::RegistryResult;
use crate::filters::{DiscoverFilters, DiscoverResult};
use crate::store::RegistryStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_LEASE: Duration = Duration::from_secs(60);

/// Guarded `agent_id -> AgentRecord` map.
#[derive(Default)]
pub struct InMemoryRegistryStore {
    agents: Mutex<HashMap<String, AgentRecord>>,
}

impl InMemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistryStore {
    async fn register(&self, registration: Registration, now: DateTime<Utc>) -> RegistryResult<Lease> {
        let lease_duration = registration
            .lease_duration
            .unwrap_or(DEFAULT_LEASE);
        let lease_until = now
            + chrono::Duration::from_std(lease_duration)
                .unwrap_or_else(|_| chrono::Duration::seconds(60));
        let status = registration.initial_status.unwrap_or(AgentStatus::Starting);

        let record = AgentRecord {
            agent_id: registration.agent_id.clone(),
            version: registration.version,
            tenant: registration.tenant,
            project: registration.project,
            capabilities: registration.capabilities,
            topics: registration.topics,
            status,
            lease_until,
            last_heartbeat: None,
            metadata: registration.metadata,
        };

        self.agents.lock().insert(registration.agent_id, record);
        Ok(Lease { lease_until })
    }

    async fn heartbeat(
        &self,
        agent_id: &str,
        status: Option<AgentStatus>,
        lease_duration: Option<Duration>,
        now: DateTime<Utc>,
    ) -> RegistryResult<Lease> {
        let mut agents = self.agents.lock();
        let record = agents
            .get_mut(agent_id)
            .ok_or_else(|| crate::error::RegistryError::AgentNotFound(agent_id.to_string()))?;

        let lease_duration = lease_duration.unwrap_or(DEFAULT_LEASE);
        let lease_until = now
            + chrono::Duration::from_std(lease_duration)
                .unwrap_or_else(|_| chrono::Duration::seconds(60));

        if let Some(status) = status {
            record.status = status;
        }
        record.last_heartbeat = Some(now);
        record.lease_until = lease_until;

        Ok(Lease { lease_until })
    }

    async fn discover(&self, filters: &DiscoverFilters, now: DateTime<Utc>) -> RegistryResult<DiscoverResult> {
        let agents = self.agents.lock();
        let mut matching: Vec<AgentRecord> = agents
            .values()
            .filter(|record| filters.matches(record, now))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));

        let total_count = matching.len() as u64;
        let offset = filters.offset.unwrap_or(0);
        let page: Vec<AgentRecord> = match filters.limit {
            Some(limit) => matching.into_iter().skip(offset).take(limit).collect(),
            None => matching.into_iter().skip(offset).collect(),
        };

        Ok(DiscoverResult {
            agents: page,
            total_count,
        })
    }

    async fn mark_expired_agents(&self, now: DateTime<Utc>) -> RegistryResult<u64> {
        let mut agents = self.agents.lock();
        let mut count = 0u64;
        for record in agents.values_mut() {
            if record.lease_until < now && record.status != AgentStatus::Unavailable {
                record.status = AgentStatus::Unavailable;
                count += 1;
            }
        }
        Ok(count)
    }
}
