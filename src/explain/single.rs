//! Single-agent explanation templates, one per event type
//!
//! The fraud template branches on audience: a user-facing explanation never
//! carries the numeric fraud score or the red-flag list (in any payload
//! field, confidence included); the operator-facing one exposes both.

use crate::domain::{
    AgentEvent, Audience, EventContext, Explanation, ExplanationPayload, ExplanationType,
};

const DEFAULT_FRAUD_CONFIDENCE: f64 = 0.5;
const USER_FRAUD_CONFIDENCE: f64 = 0.9;
const DEFAULT_SCALING_CONFIDENCE: f64 = 0.8;
const COORDINATION_CONFIDENCE: f64 = 0.9;
const GENERIC_CONFIDENCE: f64 = 0.7;

/// Explain a lone event, dispatching on its type
pub fn single_agent(event: &AgentEvent) -> Explanation {
    let payload = match &event.context {
        EventContext::FraudDetection { .. } => fraud_payload(event),
        EventContext::SystemScaling { .. } => scaling_payload(event),
        EventContext::AgentCoordination { .. } => coordination_payload(event),
        EventContext::Generic { .. } => generic_payload(event),
    };

    Explanation::for_group(
        std::slice::from_ref(event),
        event.correlation_id(),
        event.audience,
        ExplanationType::SingleAgent,
        payload,
    )
}

fn fraud_payload(event: &AgentEvent) -> ExplanationPayload {
    let EventContext::FraudDetection {
        fraud_score,
        risk_level,
        action_taken,
        red_flags,
        ..
    } = &event.context
    else {
        return generic_payload(event);
    };

    if event.audience == Audience::User {
        return ExplanationPayload {
            title: "Security Alert".to_string(),
            summary: "Transaction security check completed".to_string(),
            details: "We reviewed your transaction for security and took appropriate action \
                      based on our analysis."
                .to_string(),
            reasoning: "Our security systems protect your account from suspicious activity"
                .to_string(),
            impact: "No action is needed unless we contact you".to_string(),
            next_steps: vec![
                "Check your account activity".to_string(),
                "Contact support if you have questions".to_string(),
            ],
            confidence: USER_FRAUD_CONFIDENCE,
        };
    }

    let score_text = fraud_score
        .map(|s| format!("{s:.2}"))
        .unwrap_or_else(|| "unknown".to_string());

    let mut details = Vec::new();
    if let Some(score) = fraud_score {
        details.push(format!("Fraud Score: {score:.2}"));
    }
    if let Some(risk) = risk_level {
        details.push(format!("Risk Level: {risk}"));
    }
    if let Some(action) = action_taken {
        details.push(format!("Action: {action}"));
    }
    if !red_flags.is_empty() {
        details.push(format!("Red Flags: {}", red_flags.join("; ")));
    }
    let details = if details.is_empty() {
        "Fraud analysis completed".to_string()
    } else {
        details.join("\n")
    };

    ExplanationPayload {
        title: "Fraud Detection Alert".to_string(),
        summary: format!("Fraud analysis completed with score {score_text}"),
        details,
        reasoning: "AI-powered fraud detection based on transaction patterns".to_string(),
        impact: "Suspicious activity contained pending review".to_string(),
        next_steps: vec![
            "Review fraud analysis".to_string(),
            "Monitor user account".to_string(),
        ],
        confidence: fraud_score.unwrap_or(DEFAULT_FRAUD_CONFIDENCE),
    }
}

fn scaling_payload(event: &AgentEvent) -> ExplanationPayload {
    let EventContext::SystemScaling {
        service_name,
        from_replicas,
        to_replicas,
        trigger,
        prediction_confidence,
        estimated_duration,
    } = &event.context
    else {
        return generic_payload(event);
    };

    let service = service_name.as_deref().unwrap_or("service");
    let from = from_replicas
        .map(|r| r.to_string())
        .unwrap_or_else(|| "?".to_string());
    let to = to_replicas
        .map(|r| r.to_string())
        .unwrap_or_else(|| "?".to_string());

    let mut details = Vec::new();
    if let Some(trigger) = trigger {
        details.push(format!("Trigger: {trigger}"));
    }
    if let Some(confidence) = prediction_confidence {
        details.push(format!("Confidence: {:.0}%", confidence * 100.0));
    }
    if let Some(duration) = estimated_duration {
        details.push(format!("Duration: {duration}"));
    }
    let details = if details.is_empty() {
        "System scaling completed".to_string()
    } else {
        details.join("\n")
    };

    ExplanationPayload {
        title: "System Scaling".to_string(),
        summary: format!("Scaled {service} from {from} to {to} replicas"),
        details,
        reasoning: format!(
            "Triggered by {}",
            trigger.as_deref().unwrap_or("system conditions")
        ),
        impact: "Service capacity adjusted to match demand".to_string(),
        next_steps: vec![
            "Monitor scaling impact".to_string(),
            "Review performance metrics".to_string(),
        ],
        confidence: prediction_confidence.unwrap_or(DEFAULT_SCALING_CONFIDENCE),
    }
}

fn coordination_payload(event: &AgentEvent) -> ExplanationPayload {
    let EventContext::AgentCoordination {
        involved_agents,
        decision,
        reasoning,
        ..
    } = &event.context
    else {
        return generic_payload(event);
    };

    ExplanationPayload {
        title: "Agent Coordination".to_string(),
        summary: format!("Coordinated {} agents", involved_agents.len()),
        details: decision
            .clone()
            .unwrap_or_else(|| "Coordination decision made".to_string()),
        reasoning: reasoning
            .clone()
            .unwrap_or_else(|| "Multi-agent coordination required".to_string()),
        impact: "Agent actions aligned to avoid conflicts".to_string(),
        next_steps: vec!["Monitor coordination outcome".to_string()],
        confidence: COORDINATION_CONFIDENCE,
    }
}

/// Fallback template. Total over any event; the explanation pipeline's
/// terminal case.
fn generic_payload(event: &AgentEvent) -> ExplanationPayload {
    let description = match &event.context {
        EventContext::Generic {
            description: Some(d),
        } => d.clone(),
        _ => format!("Event processed with {} severity", event.severity),
    };

    ExplanationPayload {
        title: "System Event".to_string(),
        summary: format!(
            "{} generated {} event",
            event.source_agent,
            event.event_type()
        ),
        details: description,
        reasoning: "Automated system response".to_string(),
        impact: "No immediate impact identified".to_string(),
        next_steps: vec!["Review event details".to_string()],
        confidence: GENERIC_CONFIDENCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;

    #[test]
    fn fraud_template_defaults_score_to_unknown() {
        let event = AgentEvent::new(
            "financial-guardian",
            Severity::Medium,
            Audience::Operator,
            EventContext::FraudDetection {
                transaction_id: None,
                user_id: None,
                fraud_score: None,
                risk_level: None,
                action_taken: None,
                red_flags: vec![],
            },
        );
        let explanation = single_agent(&event);
        assert!(explanation.payload.summary.contains("unknown"));
        assert_eq!(explanation.payload.details, "Fraud analysis completed");
        assert!((explanation.payload.confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn scaling_template_reads_context_fields() {
        let event = AgentEvent::new(
            "ops-guardian",
            Severity::Medium,
            Audience::Operator,
            EventContext::SystemScaling {
                service_name: Some("frontend".to_string()),
                from_replicas: Some(2),
                to_replicas: Some(3),
                trigger: Some("High CPU usage".to_string()),
                prediction_confidence: Some(0.9),
                estimated_duration: Some("2m".to_string()),
            },
        );
        let explanation = single_agent(&event);
        assert_eq!(
            explanation.payload.summary,
            "Scaled frontend from 2 to 3 replicas"
        );
        assert!(explanation.payload.details.contains("Confidence: 90%"));
        assert_eq!(explanation.payload.reasoning, "Triggered by High CPU usage");
    }

    #[test]
    fn generic_template_is_the_terminal_fallback() {
        let event = AgentEvent::new(
            "some-agent",
            Severity::Critical,
            Audience::Both,
            EventContext::Generic { description: None },
        );
        let explanation = single_agent(&event);
        assert_eq!(explanation.payload.title, "System Event");
        assert!(explanation
            .payload
            .details
            .contains("critical severity"));
    }
}
