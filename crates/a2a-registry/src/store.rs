//! The backend-agnostic directory contract: §6 "Registry backend contract".
//!
//! Any relational engine supporting atomic upserts, set-typed columns (or a
//! join table), and an atomic conditional update across many rows can
//! implement this trait. `now` is threaded explicitly through every method
//! rather than read from the system clock internally, so callers (and
//! tests) can drive lease expiry with a virtual clock.

use crate::agent::{Lease, Registration};
use crate::error::RegistryResult;
use crate::filters::{DiscoverFilters, DiscoverResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Upsert by `agent_id`: replace `version`, `capabilities`, `topics`,
    /// `metadata`, and set `lease_until := now + lease_duration`.
    async fn register(&self, registration: Registration, now: DateTime<Utc>) -> RegistryResult<Lease>;

    /// Refresh an existing row's status and lease. Fails with
    /// `E_AGENT_NOT_FOUND` if no row exists for `agent_id`.
    async fn heartbeat(
        &self,
        agent_id: &str,
        status: Option<crate::agent::AgentStatus>,
        lease_duration: Option<Duration>,
        now: DateTime<Utc>,
    ) -> RegistryResult<Lease>;

    /// Filtered, paginated directory listing.
    async fn discover(&self, filters: &DiscoverFilters, now: DateTime<Utc>) -> RegistryResult<DiscoverResult>;

    /// Atomically transition every row with `lease_until < now AND status !=
    /// UNAVAILABLE` to `UNAVAILABLE`. Returns the count updated.
    async fn mark_expired_agents(&self, now: DateTime<Utc>) -> RegistryResult<u64>;
}
