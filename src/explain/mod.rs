//! Explanation synthesis — pure mappings from events to audience-facing
//! explanations
//!
//! Synthesis is total: every accessor has a named default, so any well-typed
//! event produces an explanation. Nothing here performs I/O or fails.

mod multi;
mod single;

use crate::domain::{AgentEvent, EventType, Explanation};

pub use single::single_agent;

/// Explain one event or one correlated group.
///
/// A group of size one is treated identically to an uncorrelated single
/// event. Larger groups classify as `coordination` when any member is an
/// `agent_coordination` event, else `multi_agent`.
pub fn explain(group: &[AgentEvent], trigger: &AgentEvent) -> Explanation {
    match group {
        [] => single::single_agent(trigger),
        [only] => single::single_agent(only),
        _ => {
            let has_coordination = group
                .iter()
                .any(|e| e.event_type() == EventType::AgentCoordination);
            if has_coordination {
                multi::coordination_group(group, trigger)
            } else {
                multi::multi_agent_group(group, trigger)
            }
        }
    }
}
