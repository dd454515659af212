//! Agent registry — last-known state per named agent
//!
//! Registrations and heartbeats overwrite wholesale; last write wins.

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::AgentState;

#[derive(Default)]
pub struct AgentRegistry {
    agents: RwLock<HashMap<String, AgentState>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the state for an agent, replacing any previous snapshot
    pub async fn register(&self, state: AgentState) {
        debug!(agent = %state.agent_name, status = %state.status, "agent state registered");
        let mut agents = self.agents.write().await;
        agents.insert(state.agent_name.clone(), state);
    }

    pub async fn get(&self, agent_name: &str) -> Option<AgentState> {
        let agents = self.agents.read().await;
        agents.get(agent_name).cloned()
    }

    /// All known agent states, keyed by name
    pub async fn all(&self) -> HashMap<String, AgentState> {
        self.agents.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.agents.read().await.len()
    }
}
