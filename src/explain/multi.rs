//! Group explanation templates — coordination scenarios and plain
//! multi-agent timelines

use crate::domain::{
    AgentEvent, EventContext, EventType, Explanation, ExplanationPayload, ExplanationType,
};

const PRIORITY_CONFLICT: &str = "priority_conflict";
const PRIORITY_CONFLICT_CONFIDENCE: f64 = 0.95;
const COORDINATION_CONFIDENCE: f64 = 0.9;
const MULTI_AGENT_CONFIDENCE: f64 = 0.85;

const DEFAULT_PRIORITY_REASONING: &str = "Coordinator decision based on system priorities";

/// Explain a group containing at least one `agent_coordination` member
pub fn coordination_group(group: &[AgentEvent], trigger: &AgentEvent) -> Explanation {
    let Some(coord_event) = group
        .iter()
        .find(|e| e.event_type() == EventType::AgentCoordination)
    else {
        return multi_agent_group(group, trigger);
    };

    let EventContext::AgentCoordination {
        coordination_type,
        decision,
        reasoning,
        estimated_duration,
        ..
    } = &coord_event.context
    else {
        return multi_agent_group(group, trigger);
    };

    let other_count = group.len() - 1;

    let payload = if coordination_type.as_deref() == Some(PRIORITY_CONFLICT) {
        ExplanationPayload {
            title: "Agent Priority Resolution".to_string(),
            summary: format!("Resolved conflict between {other_count} agents"),
            details: conflict_details(coordination_type, decision, group, coord_event),
            reasoning: reasoning
                .clone()
                .unwrap_or_else(|| DEFAULT_PRIORITY_REASONING.to_string()),
            impact: format!("Coordinated response involving {other_count} agents"),
            next_steps: match estimated_duration {
                Some(duration) => vec![
                    format!("Monitor coordination for {duration}"),
                    "Review outcome when complete".to_string(),
                ],
                None => vec![
                    "Monitor coordination progress".to_string(),
                    "Review coordination outcome".to_string(),
                ],
            },
            confidence: PRIORITY_CONFLICT_CONFIDENCE,
        }
    } else {
        ExplanationPayload {
            title: "Multi-Agent Coordination".to_string(),
            summary: format!("Coordinated action involving {} agents", group.len()),
            details: timeline(group),
            reasoning: "Multi-agent coordination for optimal system response".to_string(),
            impact: group_impact(group),
            next_steps: vec!["Monitor coordinated response progress".to_string()],
            confidence: COORDINATION_CONFIDENCE,
        }
    };

    Explanation::for_group(
        group,
        trigger.correlation_id(),
        trigger.audience,
        ExplanationType::Coordination,
        payload,
    )
}

/// Explain a correlated group with no explicit coordination member
pub fn multi_agent_group(group: &[AgentEvent], trigger: &AgentEvent) -> Explanation {
    let mut agents: Vec<&str> = group.iter().map(|e| e.source_agent.as_str()).collect();
    agents.sort_unstable();
    agents.dedup();

    let payload = ExplanationPayload {
        title: "Multi-Agent Response".to_string(),
        summary: format!("Coordinated response from {} agents", agents.len()),
        details: timeline(group),
        reasoning: "Multiple agents responded to related system conditions".to_string(),
        impact: group_impact(group),
        next_steps: vec!["Monitor multi-agent response progress".to_string()],
        confidence: MULTI_AGENT_CONFIDENCE,
    };

    Explanation::for_group(
        group,
        trigger.correlation_id(),
        trigger.audience,
        ExplanationType::MultiAgent,
        payload,
    )
}

/// One line per event, chronological: `"<seq>. [<HH:MM:SS>] <agent>: <type>"`
fn timeline(group: &[AgentEvent]) -> String {
    let mut ordered: Vec<&AgentEvent> = group.iter().collect();
    ordered.sort_by_key(|e| e.timestamp);

    ordered
        .iter()
        .enumerate()
        .map(|(i, event)| {
            format!(
                "{}. [{}] {}: {}",
                i + 1,
                event.timestamp.format("%H:%M:%S"),
                event.source_agent,
                event.event_type()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn group_impact(group: &[AgentEvent]) -> String {
    format!(
        "Multi-agent response with {} coordinated actions",
        group.len()
    )
}

fn conflict_details(
    coordination_type: &Option<String>,
    decision: &Option<String>,
    group: &[AgentEvent],
    coord_event: &AgentEvent,
) -> String {
    let mut lines = vec![
        format!(
            "Conflict: {}",
            coordination_type.as_deref().unwrap_or("Unknown conflict")
        ),
        format!(
            "Decision: {}",
            decision.as_deref().unwrap_or("Coordination decision made")
        ),
    ];

    if let EventContext::AgentCoordination {
        involved_agents,
        reasoning,
        ..
    } = &coord_event.context
    {
        if !involved_agents.is_empty() {
            lines.push(format!("Affected Agents: {}", involved_agents.join(", ")));
        }
        if let Some(reasoning) = reasoning {
            lines.push(format!("Reasoning: {reasoning}"));
        }
    }

    let others = group
        .iter()
        .filter(|e| e.id != coord_event.id)
        .map(|e| e.source_agent.as_str())
        .collect::<Vec<_>>();
    if !others.is_empty() {
        lines.push(format!("Correlated With: {}", others.join(", ")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Audience, Severity};
    use chrono::{Duration, Utc};

    fn generic_event(agent: &str, secs_ago: i64) -> AgentEvent {
        let mut event = AgentEvent::new(
            agent,
            Severity::Low,
            Audience::Operator,
            EventContext::Generic { description: None },
        )
        .with_correlation_id("corr-1");
        event.timestamp = Utc::now() - Duration::seconds(secs_ago);
        event
    }

    #[test]
    fn timeline_sorts_and_numbers_events() {
        let group = vec![generic_event("b-agent", 10), generic_event("a-agent", 40)];
        let rendered = timeline(&group);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1. ["));
        assert!(lines[0].contains("a-agent: generic"));
        assert!(lines[1].starts_with("2. ["));
        assert!(lines[1].contains("b-agent: generic"));
    }

    #[test]
    fn priority_conflict_supplies_duration_aware_next_steps() {
        let mut coord = AgentEvent::new(
            "coordinator-agent",
            Severity::Medium,
            Audience::Operator,
            EventContext::AgentCoordination {
                coordination_type: Some("priority_conflict".to_string()),
                involved_agents: vec!["ops-guardian".to_string()],
                decision: None,
                reasoning: None,
                estimated_duration: Some("10 minutes".to_string()),
            },
        );
        coord.correlation_id = Some("corr-1".to_string());
        let group = vec![generic_event("ops-guardian", 5), coord.clone()];

        let explanation = coordination_group(&group, &coord);
        assert_eq!(
            explanation.payload.next_steps[0],
            "Monitor coordination for 10 minutes"
        );
        assert!(explanation.payload.details.contains("Decision: Coordination decision made"));
    }
}
