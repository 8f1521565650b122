//! Agent identity, lease, and discovery record shapes: §3.3 of the contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Liveness status of an agent's lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    Starting,
    Healthy,
    Degraded,
    Unavailable,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Starting => "STARTING",
            AgentStatus::Healthy => "HEALTHY",
            AgentStatus::Degraded => "DEGRADED",
            AgentStatus::Unavailable => "UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STARTING" => Ok(AgentStatus::Starting),
            "HEALTHY" => Ok(AgentStatus::Healthy),
            "DEGRADED" => Ok(AgentStatus::Degraded),
            "UNAVAILABLE" => Ok(AgentStatus::Unavailable),
            other => Err(format!("unknown agent status: {other}")),
        }
    }
}

/// The role an agent plays on one of its subscribed topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicRole {
    Subscriber,
    Publisher,
    Both,
}

impl std::fmt::Display for TopicRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TopicRole::Subscriber => "subscriber",
            TopicRole::Publisher => "publisher",
            TopicRole::Both => "both",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TopicRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscriber" => Ok(TopicRole::Subscriber),
            "publisher" => Ok(TopicRole::Publisher),
            "both" => Ok(TopicRole::Both),
            other => Err(format!("unknown topic role: {other}")),
        }
    }
}

/// A `(topic_name, role)` pair an agent has declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTopic {
    pub topic: String,
    pub role: TopicRole,
}

/// Caller-supplied fields for [`crate::Registry::register`]. Everything
/// about the agent except its derived lease.
#[derive(Debug, Clone)]
pub struct Registration {
    pub agent_id: String,
    pub version: String,
    pub tenant: String,
    pub project: String,
    pub capabilities: HashSet<String>,
    pub topics: Vec<AgentTopic>,
    pub metadata: HashMap<String, serde_json::Value>,
    /// Defaults to `STARTING` per §3.3 unless the caller explicitly asks
    /// for `HEALTHY`.
    pub initial_status: Option<AgentStatus>,
    /// Defaults to the registry's configured default (60s) when absent.
    pub lease_duration: Option<Duration>,
}

impl Registration {
    pub fn new(
        agent_id: impl Into<String>,
        version: impl Into<String>,
        tenant: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            version: version.into(),
            tenant: tenant.into(),
            project: project.into(),
            capabilities: HashSet::new(),
            topics: Vec::new(),
            metadata: HashMap::new(),
            initial_status: None,
            lease_duration: None,
        }
    }

    pub fn with_capabilities(mut self, capabilities: impl IntoIterator<Item = String>) -> Self {
        self.capabilities = capabilities.into_iter().collect();
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>, role: TopicRole) -> Self {
        self.topics.push(AgentTopic {
            topic: topic.into(),
            role,
        });
        self
    }

    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.initial_status = Some(status);
        self
    }

    pub fn with_lease_duration(mut self, duration: Duration) -> Self {
        self.lease_duration = Some(duration);
        self
    }
}

/// The row stored for one agent, and the shape returned by `discover`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub agent_id: String,
    pub version: String,
    pub tenant: String,
    pub project: String,
    pub capabilities: HashSet<String>,
    pub topics: Vec<AgentTopic>,
    pub status: AgentStatus,
    pub lease_until: DateTime<Utc>,
    pub last_heartbeat: Option<DateTime<Utc>>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl AgentRecord {
    /// Live iff `now <= lease_until` AND `status != UNAVAILABLE` (§3.3).
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now <= self.lease_until && self.status != AgentStatus::Unavailable
    }
}

/// Result of a successful `register`/`heartbeat` call: just the refreshed
/// expiry, since that's the only field every caller needs back immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub lease_until: DateTime<Utc>,
}
