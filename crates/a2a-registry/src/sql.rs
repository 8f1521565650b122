//! SQL-backed registry store (feature `sql`).
//!
//! Concrete instance of the backend contract in spec §6: atomic upserts,
//! set-typed columns via join tables, and an atomic conditional
//! `UPDATE ... WHERE` for `mark_expired_agents`. Schema follows the
//! `agents` / `agent_capabilities` / `agent_topics` tables named there.
//! Modeled on `mofa-foundation::persistence::sqlite::SqliteStore`'s
//! connect/migrate/query shape.

use crate::agent::{AgentRecord, AgentStatus, AgentTopic, Lease, Registration, TopicRole};
use crate::error::{RegistryError, RegistryResult};
use crate::filters::{DiscoverFilters, DiscoverResult};
use crate::store::RegistryStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

const DEFAULT_LEASE: Duration = Duration::from_secs(60);

/// sqlx-backed store. Any sqlx-supported relational backend with the same
/// table shapes would work; this connects via a generic database URL the
/// way `SqliteStore::connect` does.
pub struct SqlRegistryStore {
    pool: SqlitePool,
}

impl SqlRegistryStore {
    pub async fn connect(database_url: &str) -> RegistryResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    pub async fn in_memory() -> RegistryResult<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn run_migrations(&self) -> RegistryResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS agents (
                agent_id TEXT PRIMARY KEY,
                version TEXT NOT NULL,
                tenant TEXT NOT NULL,
                project TEXT NOT NULL,
                status TEXT NOT NULL,
                lease_until TEXT NOT NULL,
                last_heartbeat TEXT,
                metadata TEXT NOT NULL DEFAULT '{}'
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| RegistryError::Unavailable(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS agent_capabilities (
                agent_id TEXT NOT NULL,
                capability TEXT NOT NULL,
                PRIMARY KEY (agent_id, capability)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| RegistryError::Unavailable(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS agent_topics (
                agent_id TEXT NOT NULL,
                topic TEXT NOT NULL,
                role TEXT NOT NULL,
                PRIMARY KEY (agent_id, topic)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| RegistryError::Unavailable(e.to_string()))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_agents_tenant_project ON agents(tenant, project)")
            .execute(&self.pool)
            .await
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn row_to_record(&self, agent_id: &str, row: &sqlx::sqlite::SqliteRow) -> RegistryResult<AgentRecord> {
        let status: String = row.try_get("status").map_err(sql_err)?;
        let lease_until: String = row.try_get("lease_until").map_err(sql_err)?;
        let last_heartbeat: Option<String> = row.try_get("last_heartbeat").map_err(sql_err)?;
        let metadata_json: String = row.try_get("metadata").map_err(sql_err)?;

        let capabilities = self.load_capabilities(agent_id).await?;
        let topics = self.load_topics(agent_id).await?;

        Ok(AgentRecord {
            agent_id: agent_id.to_string(),
            version: row.try_get("version").map_err(sql_err)?,
            tenant: row.try_get("tenant").map_err(sql_err)?,
            project: row.try_get("project").map_err(sql_err)?,
            capabilities,
            topics,
            status: status.parse().map_err(RegistryError::Unavailable)?,
            lease_until: parse_ts(&lease_until)?,
            last_heartbeat: last_heartbeat.as_deref().map(parse_ts).transpose()?,
            metadata: serde_json::from_str(&metadata_json).unwrap_or_default(),
        })
    }

    async fn load_capabilities(&self, agent_id: &str) -> RegistryResult<HashSet<String>> {
        let rows = sqlx::query("SELECT capability FROM agent_capabilities WHERE agent_id = ?")
            .bind(agent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(sql_err)?;
        rows.into_iter()
            .map(|row| row.try_get::<String, _>("capability").map_err(sql_err))
            .collect()
    }

    async fn load_topics(&self, agent_id: &str) -> RegistryResult<Vec<AgentTopic>> {
        let rows = sqlx::query("SELECT topic, role FROM agent_topics WHERE agent_id = ?")
            .bind(agent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(sql_err)?;
        rows.into_iter()
            .map(|row| {
                let topic: String = row.try_get("topic").map_err(sql_err)?;
                let role: String = row.try_get("role").map_err(sql_err)?;
                let role: TopicRole = role.parse().map_err(RegistryError::Unavailable)?;
                Ok(AgentTopic { topic, role })
            })
            .collect()
    }
}

fn sql_err(e: sqlx::Error) -> RegistryError {
    RegistryError::Unavailable(e.to_string())
}

fn parse_ts(s: &str) -> RegistryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RegistryError::Unavailable(format!("corrupt timestamp {s:?}: {e}")))
}

fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[async_trait]
impl RegistryStore for SqlRegistryStore {
    async fn register(&self, registration: Registration, now: DateTime<Utc>) -> RegistryResult<Lease> {
        let lease_duration = registration.lease_duration.unwrap_or(DEFAULT_LEASE);
        let lease_until = now
            + chrono::Duration::from_std(lease_duration).unwrap_or_else(|_| chrono::Duration::seconds(60));
        let status = registration.initial_status.unwrap_or(AgentStatus::Starting);
        let metadata_json = serde_json::to_string(&registration.metadata).map_err(|e| RegistryError::Unavailable(e.to_string()))?;

        let mut tx = self.pool.begin().await.map_err(sql_err)?;

        sqlx::query(
            r#"
            INSERT INTO agents (agent_id, version, tenant, project, status, lease_until, last_heartbeat, metadata)
            VALUES (?, ?, ?, ?, ?, ?, NULL, ?)
            ON CONFLICT(agent_id) DO UPDATE SET
                version = excluded.version,
                tenant = excluded.tenant,
                project = excluded.project,
                status = excluded.status,
                lease_until = excluded.lease_until,
                metadata = excluded.metadata
            "#,
        )
        .bind(&registration.agent_id)
        .bind(&registration.version)
        .bind(&registration.tenant)
        .bind(&registration.project)
        .bind(status.as_str())
        .bind(fmt_ts(lease_until))
        .bind(metadata_json)
        .execute(&mut *tx)
        .await
        .map_err(sql_err)?;

        // Topic rows for the agent are replaced atomically (§4.3.1).
        sqlx::query("DELETE FROM agent_capabilities WHERE agent_id = ?")
            .bind(&registration.agent_id)
            .execute(&mut *tx)
            .await
            .map_err(sql_err)?;
        for capability in &registration.capabilities {
            sqlx::query("INSERT INTO agent_capabilities (agent_id, capability) VALUES (?, ?)")
                .bind(&registration.agent_id)
                .bind(capability)
                .execute(&mut *tx)
                .await
                .map_err(sql_err)?;
        }

        sqlx::query("DELETE FROM agent_topics WHERE agent_id = ?")
            .bind(&registration.agent_id)
            .execute(&mut *tx)
            .await
            .map_err(sql_err)?;
        for topic in &registration.topics {
            sqlx::query("INSERT INTO agent_topics (agent_id, topic, role) VALUES (?, ?, ?)")
                .bind(&registration.agent_id)
                .bind(&topic.topic)
                .bind(topic.role.to_string())
                .execute(&mut *tx)
                .await
                .map_err(sql_err)?;
        }

        tx.commit().await.map_err(sql_err)?;
        Ok(Lease { lease_until })
    }

    async fn heartbeat(
        &self,
        agent_id: &str,
        status: Option<AgentStatus>,
        lease_duration: Option<Duration>,
        now: DateTime<Utc>,
    ) -> RegistryResult<Lease> {
        let existing = sqlx::query("SELECT status FROM agents WHERE agent_id = ?")
            .bind(agent_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(sql_err)?;
        let Some(existing) = existing else {
            return Err(RegistryError::AgentNotFound(agent_id.to_string()));
        };
        let current_status: String = existing.try_get("status").map_err(sql_err)?;

        let lease_duration = lease_duration.unwrap_or(DEFAULT_LEASE);
        let lease_until = now
            + chrono::Duration::from_std(lease_duration).unwrap_or_else(|_| chrono::Duration::seconds(60));
        let next_status = status.map(|s| s.as_str().to_string()).unwrap_or(current_status);

        sqlx::query(
            "UPDATE agents SET status = ?, lease_until = ?, last_heartbeat = ? WHERE agent_id = ?",
        )
        .bind(next_status)
        .bind(fmt_ts(lease_until))
        .bind(fmt_ts(now))
        .bind(agent_id)
        .execute(&self.pool)
        .await
        .map_err(sql_err)?;

        Ok(Lease { lease_until })
    }

    async fn discover(&self, filters: &DiscoverFilters, now: DateTime<Utc>) -> RegistryResult<DiscoverResult> {
        let rows = sqlx::query("SELECT agent_id, version, tenant, project, status, lease_until, last_heartbeat, metadata FROM agents ORDER BY agent_id")
            .fetch_all(&self.pool)
            .await
            .map_err(sql_err)?;

        let mut matching = Vec::new();
        for row in &rows {
            let agent_id: String = row.try_get("agent_id").map_err(sql_err)?;
            let record = self.row_to_record(&agent_id, row).await?;
            if filters.matches(&record, now) {
                matching.push(record);
            }
        }

        let total_count = matching.len() as u64;
        let offset = filters.offset.unwrap_or(0);
        let page = match filters.limit {
            Some(limit) => matching.into_iter().skip(offset).take(limit).collect(),
            None => matching.into_iter().skip(offset).collect(),
        };

        Ok(DiscoverResult {
            agents: page,
            total_count,
        })
    }

    async fn mark_expired_agents(&self, now: DateTime<Utc>) -> RegistryResult<u64> {
        let result = sqlx::query(
            "UPDATE agents SET status = ? WHERE lease_until < ? AND status != ?",
        )
        .bind(AgentStatus::Unavailable.as_str())
        .bind(fmt_ts(now))
        .bind(AgentStatus::Unavailable.as_str())
        .execute(&self.pool)
        .await
        .map_err(sql_err)?;

        Ok(result.rows_affected())
    }
}
