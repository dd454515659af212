//! Bounded, time-windowed event storage keyed by correlation id
//!
//! Eviction is lazy: the owning service runs `evict` synchronously before
//! every grouping read, so callers never observe entries outside the window.
//! The store itself is not locked — the owner serializes access so that an
//! insert, its eviction pass, and the read-back form one critical section.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::domain::AgentEvent;

/// Windowed event buffer. Events sharing a non-empty correlation id land in
/// one bucket; uncorrelated events never enter the store.
#[derive(Debug)]
pub struct EventStore {
    buckets: HashMap<String, Vec<AgentEvent>>,
    window: Duration,
}

impl EventStore {
    pub fn new(window_secs: u64) -> Self {
        Self {
            buckets: HashMap::new(),
            window: Duration::seconds(window_secs as i64),
        }
    }

    /// Append an event to its correlation bucket. Events without a
    /// correlation id are a caller error here; the service routes them
    /// around the store.
    pub fn insert(&mut self, event: AgentEvent) {
        let Some(correlation_id) = event.correlation_id().map(String::from) else {
            return;
        };
        self.buckets.entry(correlation_id).or_default().push(event);
    }

    /// Drop every event older than `now - window`; delete buckets left empty
    pub fn evict(&mut self, now: DateTime<Utc>) {
        let cutoff = now - self.window;
        self.buckets.retain(|_, events| {
            events.retain(|e| e.timestamp > cutoff);
            !events.is_empty()
        });
    }

    /// Current live members of a correlation group, sorted by timestamp
    /// ascending. Equal timestamps keep insertion order (stable sort over
    /// the append-ordered bucket). An unknown id yields an empty group,
    /// which is valid and means "nothing currently correlated".
    pub fn group_for(&self, correlation_id: &str) -> Vec<AgentEvent> {
        let mut group = self
            .buckets
            .get(correlation_id)
            .cloned()
            .unwrap_or_default();
        group.sort_by_key(|e| e.timestamp);
        group
    }

    /// Number of live correlation buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total buffered events across all buckets
    pub fn event_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Audience, EventContext, Severity};

    fn event_at(correlation_id: &str, secs_ago: i64) -> AgentEvent {
        let mut event = AgentEvent::new(
            "ops-guardian",
            Severity::Low,
            Audience::Operator,
            EventContext::Generic { description: None },
        )
        .with_correlation_id(correlation_id);
        event.timestamp = Utc::now() - Duration::seconds(secs_ago);
        event
    }

    #[test]
    fn groups_sort_by_timestamp_ascending() {
        let mut store = EventStore::new(300);
        store.insert(event_at("corr-1", 10));
        store.insert(event_at("corr-1", 30));
        store.insert(event_at("corr-1", 20));

        let group = store.group_for("corr-1");
        assert_eq!(group.len(), 3);
        assert!(group.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let mut store = EventStore::new(300);
        let ts = Utc::now();
        let mut first = event_at("corr-1", 0);
        first.timestamp = ts;
        let mut second = event_at("corr-1", 0);
        second.timestamp = ts;

        let (first_id, second_id) = (first.id, second.id);
        store.insert(first);
        store.insert(second);

        let group = store.group_for("corr-1");
        assert_eq!(group[0].id, first_id);
        assert_eq!(group[1].id, second_id);
    }

    #[test]
    fn eviction_honors_window_boundary() {
        let base = Utc::now();
        let mut store = EventStore::new(300);
        let mut event = event_at("corr-1", 0);
        event.timestamp = base;
        store.insert(event);

        // Inside the window at t=299s
        store.evict(base + Duration::seconds(299));
        assert_eq!(store.group_for("corr-1").len(), 1);

        // Outside the window at t=301s; the empty bucket is deleted
        store.evict(base + Duration::seconds(301));
        assert!(store.group_for("corr-1").is_empty());
        assert_eq!(store.bucket_count(), 0);
    }

    #[test]
    fn group_read_is_idempotent() {
        let mut store = EventStore::new(300);
        store.insert(event_at("corr-1", 5));
        store.insert(event_at("corr-1", 2));

        let first: Vec<_> = store.group_for("corr-1").iter().map(|e| e.id).collect();
        let second: Vec<_> = store.group_for("corr-1").iter().map(|e| e.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn uncorrelated_events_never_enter_the_store() {
        let mut store = EventStore::new(300);
        store.insert(AgentEvent::new(
            "ops-guardian",
            Severity::Low,
            Audience::Operator,
            EventContext::Generic { description: None },
        ));
        assert_eq!(store.event_count(), 0);
    }
}
