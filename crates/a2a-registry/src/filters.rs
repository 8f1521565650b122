//! `discover` filter shape: §4.3.1.

use crate::agent::{AgentRecord, AgentStatus};
use chrono::{DateTime, Utc};

/// Filters for [`crate::Registry::discover`]. All set filters are ANDed.
#[derive(Debug, Clone, Default)]
pub struct DiscoverFilters {
    pub capability: Option<String>,
    pub tenant: Option<String>,
    pub project: Option<String>,
    /// Explicit status filter. When absent, the default is "any
    /// non-`UNAVAILABLE`" per §4.3.1.
    pub status: Option<AgentStatus>,
    pub agent_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl DiscoverFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Whether `record` satisfies every set filter, excluding the
    /// `limit`/`offset` pagination fields which apply to the whole result.
    ///
    /// `now` enforces §4.3.2's fourth invariant: absent an explicit `status`
    /// filter, a row whose lease has already expired (`lease_until < now`)
    /// is excluded even if a sweep hasn't yet flipped its stored status to
    /// `Unavailable`. An explicit `status` filter (including
    /// `Unavailable`) bypasses this liveness check and is taken at face
    /// value.
    pub(crate) fn matches(&self, record: &AgentRecord, now: DateTime<Utc>) -> bool {
        if let Some(agent_id) = &self.agent_id {
            if &record.agent_id != agent_id {
                return false;
            }
        }
        if let Some(capability) = &self.capability {
            if !record.capabilities.contains(capability) {
                return false;
            }
        }
        if let Some(tenant) = &self.tenant {
            if &record.tenant != tenant {
                return false;
            }
        }
        if let Some(project) = &self.project {
            if &record.project != project {
                return false;
            }
        }
        match self.status {
            Some(status) => record.status == status,
            None => record.status != AgentStatus::Unavailable && record.lease_until >= now,
        }
    }
}

/// Result of [`crate::Registry::discover`]: the page of matching agents plus
/// the total count before pagination was applied.
#[derive(Debug, Clone, Default)]
pub struct DiscoverResult {
    pub agents: Vec<AgentRecord>,
    pub total_count: u64,
}
