//! Per-domain pause/resume state
//!
//! A coordination domain names one axis of conflicting agent intents (e.g.
//! "scaling-vs-fraud"). Any action whose policy must yield to another
//! agent's activity consults its domain before executing. Transitions happen
//! only through explicit pause/resume calls; resume clears the reason.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

/// Pause record for one coordination domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainState {
    pub paused: bool,
    pub reason: String,
    pub set_at: DateTime<Utc>,
    pub set_by: String,
}

impl Default for DomainState {
    fn default() -> Self {
        Self {
            paused: false,
            reason: String::new(),
            set_at: Utc::now(),
            set_by: String::new(),
        }
    }
}

#[derive(Default)]
pub struct CoordinationRegistry {
    domains: RwLock<HashMap<String, DomainState>>,
}

impl CoordinationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn pause(&self, domain: &str, reason: &str, set_by: &str) {
        info!(domain, reason, set_by, "coordination domain paused");
        let mut domains = self.domains.write().await;
        domains.insert(
            domain.to_string(),
            DomainState {
                paused: true,
                reason: reason.to_string(),
                set_at: Utc::now(),
                set_by: set_by.to_string(),
            },
        );
    }

    pub async fn resume(&self, domain: &str) {
        info!(domain, "coordination domain resumed");
        let mut domains = self.domains.write().await;
        domains.insert(
            domain.to_string(),
            DomainState {
                paused: false,
                reason: String::new(),
                set_at: Utc::now(),
                set_by: String::new(),
            },
        );
    }

    /// Pause flag and reason for a domain. Unknown domains are not paused.
    pub async fn is_paused(&self, domain: &str) -> (bool, String) {
        let domains = self.domains.read().await;
        match domains.get(domain) {
            Some(state) => (state.paused, state.reason.clone()),
            None => (false, String::new()),
        }
    }

    pub async fn get(&self, domain: &str) -> Option<DomainState> {
        self.domains.read().await.get(domain).cloned()
    }

    /// All known domain states (dashboard surface)
    pub async fn all(&self) -> HashMap<String, DomainState> {
        self.domains.read().await.clone()
    }
}
