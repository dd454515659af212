//! Correlation service — the submission orchestrator
//!
//! Owns the windowed event store behind a single lock. A submission's
//! insert, eviction pass, and group read-back form one critical section, so
//! concurrent submitters never observe a half-evicted bucket and group
//! membership only grows with submission order (time-based eviction is the
//! sole way a group shrinks).

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{AgentEvent, Explanation};
use crate::error::{GuardianError, Result};
use crate::explain;

use super::store::EventStore;

const EXPLANATION_CHANNEL_CAPACITY: usize = 64;

pub struct CorrelationService {
    store: RwLock<EventStore>,
    explanation_tx: broadcast::Sender<Explanation>,
}

impl CorrelationService {
    pub fn new(window_secs: u64) -> Self {
        let (explanation_tx, _) = broadcast::channel(EXPLANATION_CHANNEL_CAPACITY);
        Self {
            store: RwLock::new(EventStore::new(window_secs)),
            explanation_tx,
        }
    }

    /// Subscribe to every explanation the service generates. Lagging
    /// receivers drop messages; they never block submission.
    pub fn subscribe(&self) -> broadcast::Receiver<Explanation> {
        self.explanation_tx.subscribe()
    }

    /// Ingest one event and explain it.
    ///
    /// Correlated events pass through the store; the group read decides the
    /// explanation path. Correlation activates retroactively: the first
    /// event of a pair is explained single-agent at submission time, and
    /// callers wanting the upgraded view re-query the correlation id.
    /// Uncorrelated events skip the store entirely.
    pub async fn submit(&self, event: AgentEvent) -> Result<Explanation> {
        event.validate()?;

        let explanation = match event.correlation_id() {
            Some(correlation_id) => {
                let correlation_id = correlation_id.to_string();
                let mut store = self.store.write().await;
                store.insert(event.clone());
                store.evict(Utc::now());
                let group = store.group_for(&correlation_id);
                drop(store);

                debug!(
                    correlation_id = %correlation_id,
                    group_size = group.len(),
                    "event joined correlation group"
                );
                explain::explain(&group, &event)
            }
            None => explain::single_agent(&event),
        };

        info!(
            event_id = %event.id,
            explanation_id = %explanation.id,
            explanation_type = %explanation.explanation_type,
            "event explained"
        );

        let _ = self.explanation_tx.send(explanation.clone());
        Ok(explanation)
    }

    /// Ingest a batch of related events.
    ///
    /// Events missing a correlation id receive one shared fresh id, then
    /// each event is submitted in order. The explanation for the final
    /// event is returned; with monotone group growth it is the
    /// most-informed one.
    pub async fn submit_batch(&self, events: Vec<AgentEvent>) -> Result<Explanation> {
        if events.is_empty() {
            return Err(GuardianError::InvalidInput(
                "event batch must not be empty".to_string(),
            ));
        }

        let shared_id = events
            .iter()
            .find_map(|e| e.correlation_id().map(String::from))
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut last = None;
        for mut event in events {
            if event.correlation_id().is_none() {
                event.correlation_id = Some(shared_id.clone());
            }
            last = Some(self.submit(event).await?);
        }

        // Non-empty batch, so at least one submission succeeded
        last.ok_or_else(|| GuardianError::Internal("batch produced no explanation".to_string()))
    }

    /// Live members of a correlation group, after eviction. An empty result
    /// means nothing is currently correlated under this id.
    pub async fn group_for(&self, correlation_id: &str) -> Vec<AgentEvent> {
        let mut store = self.store.write().await;
        store.evict(Utc::now());
        store.group_for(correlation_id)
    }

    /// Number of live correlation buckets (dashboard surface)
    pub async fn active_correlations(&self) -> usize {
        let mut store = self.store.write().await;
        store.evict(Utc::now());
        store.bucket_count()
    }
}
