//! Per-agent state snapshots held by the registry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Agent status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Paused,
    Stopped,
    Error,
}

impl AgentStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, AgentStatus::Active)
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::Active => write!(f, "active"),
            AgentStatus::Paused => write!(f, "paused"),
            AgentStatus::Stopped => write!(f, "stopped"),
            AgentStatus::Error => write!(f, "error"),
        }
    }
}

/// Last-known state of one named agent. Overwritten wholesale on each
/// registration or heartbeat; last write wins, no merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub agent_name: String,
    pub status: AgentStatus,
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Strategy-specific metrics (open map for extensibility across agents)
    #[serde(default)]
    pub metrics: HashMap<String, serde_json::Value>,
    #[serde(default = "Utc::now")]
    pub last_update: DateTime<Utc>,
}

impl AgentState {
    pub fn new(agent_name: &str, status: AgentStatus) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            status,
            capabilities: Vec::new(),
            metrics: HashMap::new(),
            last_update: Utc::now(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: &[&str]) -> Self {
        self.capabilities = capabilities.iter().map(|c| c.to_string()).collect();
        self
    }
}
