//! Explanations — the synthesized, audience-facing output records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::{AgentEvent, Audience};

/// How the explained scenario was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationType {
    SingleAgent,
    MultiAgent,
    Coordination,
}

impl std::fmt::Display for ExplanationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExplanationType::SingleAgent => write!(f, "single_agent"),
            ExplanationType::MultiAgent => write!(f, "multi_agent"),
            ExplanationType::Coordination => write!(f, "coordination"),
        }
    }
}

/// The human-readable body of an explanation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationPayload {
    pub title: String,
    pub summary: String,
    pub details: String,
    pub reasoning: String,
    pub impact: String,
    pub next_steps: Vec<String>,
    /// Confidence in the explanation, in [0, 1]
    pub confidence: f64,
}

/// One explanation for one event or one correlated group. Created fresh per
/// request and never mutated; callers that want history store it externally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub id: Uuid,
    pub event_ids: Vec<Uuid>,
    pub correlation_id: Option<String>,
    pub audience: Audience,
    pub explanation_type: ExplanationType,
    pub involved_agents: Vec<String>,
    pub payload: ExplanationPayload,
    pub generated_at: DateTime<Utc>,
}

impl Explanation {
    /// Assemble an explanation for a group, deriving `event_ids` and the
    /// deduplicated `involved_agents` set from the members.
    pub fn for_group(
        group: &[AgentEvent],
        correlation_id: Option<&str>,
        audience: Audience,
        explanation_type: ExplanationType,
        payload: ExplanationPayload,
    ) -> Self {
        let mut involved_agents: Vec<String> = Vec::new();
        for event in group {
            if !involved_agents.contains(&event.source_agent) {
                involved_agents.push(event.source_agent.clone());
            }
        }

        Self {
            id: Uuid::new_v4(),
            event_ids: group.iter().map(|e| e.id).collect(),
            correlation_id: correlation_id.map(String::from),
            audience,
            explanation_type,
            involved_agents,
            payload,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{EventContext, Severity};

    fn event_from(agent: &str) -> AgentEvent {
        AgentEvent::new(
            agent,
            Severity::Low,
            Audience::Operator,
            EventContext::Generic { description: None },
        )
    }

    #[test]
    fn involved_agents_deduplicate_preserving_order() {
        let group = vec![
            event_from("financial-guardian"),
            event_from("ops-guardian"),
            event_from("financial-guardian"),
        ];
        let explanation = Explanation::for_group(
            &group,
            Some("corr-1"),
            Audience::Operator,
            ExplanationType::MultiAgent,
            ExplanationPayload {
                title: "t".to_string(),
                summary: "s".to_string(),
                details: "d".to_string(),
                reasoning: "r".to_string(),
                impact: "i".to_string(),
                next_steps: vec![],
                confidence: 0.5,
            },
        );

        assert_eq!(
            explanation.involved_agents,
            vec!["financial-guardian", "ops-guardian"]
        );
        assert_eq!(explanation.event_ids.len(), 3);
        assert_eq!(explanation.correlation_id.as_deref(), Some("corr-1"));
    }
}
