//! Agent events — the immutable records the correlation engine ingests
//!
//! Each agent emits an event when it takes an observable action. The payload
//! is a tagged variant per event type so templates read typed fields instead
//! of guessing at an open dictionary; unknown event types are rejected at
//! deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GuardianError, Result};

/// Event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Consumer class an explanation is written for. `User` gates diagnostic
/// detail; `Operator` sees everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    User,
    Operator,
    Both,
}

impl Audience {
    /// Whether internal diagnostic fields (scores, red flags) may be exposed
    pub fn sees_diagnostics(&self) -> bool {
        matches!(self, Audience::Operator | Audience::Both)
    }
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Audience::User => write!(f, "user"),
            Audience::Operator => write!(f, "operator"),
            Audience::Both => write!(f, "both"),
        }
    }
}

/// Discriminant of [`EventContext`], used for template dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    FraudDetection,
    SystemScaling,
    AgentCoordination,
    Generic,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::FraudDetection => write!(f, "fraud_detection"),
            EventType::SystemScaling => write!(f, "system_scaling"),
            EventType::AgentCoordination => write!(f, "agent_coordination"),
            EventType::Generic => write!(f, "generic"),
        }
    }
}

/// Per-type event payload. One shape per event type, carrying only the
/// fields the explanation templates read. Flattened into [`AgentEvent`] so
/// the wire shape is `{"event_type": "...", "context": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "context", rename_all = "snake_case")]
pub enum EventContext {
    FraudDetection {
        #[serde(default)]
        transaction_id: Option<String>,
        #[serde(default)]
        user_id: Option<String>,
        #[serde(default)]
        fraud_score: Option<f64>,
        #[serde(default)]
        risk_level: Option<String>,
        #[serde(default)]
        action_taken: Option<String>,
        #[serde(default)]
        red_flags: Vec<String>,
    },
    SystemScaling {
        #[serde(default)]
        service_name: Option<String>,
        #[serde(default)]
        from_replicas: Option<u32>,
        #[serde(default)]
        to_replicas: Option<u32>,
        #[serde(default)]
        trigger: Option<String>,
        #[serde(default)]
        prediction_confidence: Option<f64>,
        #[serde(default)]
        estimated_duration: Option<String>,
    },
    AgentCoordination {
        #[serde(default)]
        coordination_type: Option<String>,
        #[serde(default)]
        involved_agents: Vec<String>,
        #[serde(default)]
        decision: Option<String>,
        #[serde(default)]
        reasoning: Option<String>,
        #[serde(default)]
        estimated_duration: Option<String>,
    },
    Generic {
        #[serde(default)]
        description: Option<String>,
    },
}

impl EventContext {
    pub fn event_type(&self) -> EventType {
        match self {
            EventContext::FraudDetection { .. } => EventType::FraudDetection,
            EventContext::SystemScaling { .. } => EventType::SystemScaling,
            EventContext::AgentCoordination { .. } => EventType::AgentCoordination,
            EventContext::Generic { .. } => EventType::Generic,
        }
    }
}

/// Immutable record of one observable agent action. Never mutated after
/// creation; discarded on window eviction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEvent {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub source_agent: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub audience: Audience,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(flatten)]
    pub context: EventContext,
}

impl AgentEvent {
    pub fn new(source_agent: &str, severity: Severity, audience: Audience, context: EventContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_agent: source_agent.to_string(),
            timestamp: Utc::now(),
            severity,
            audience,
            correlation_id: None,
            context,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: &str) -> Self {
        self.correlation_id = Some(correlation_id.to_string());
        self
    }

    pub fn event_type(&self) -> EventType {
        self.context.event_type()
    }

    /// Correlation id, with the empty string treated as absent
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Ingestion validation. Missing required fields are rejected, never
    /// silently defaulted.
    pub fn validate(&self) -> Result<()> {
        if self.source_agent.trim().is_empty() {
            return Err(GuardianError::InvalidInput(
                "event source_agent must not be empty".to_string(),
            ));
        }
        if let EventContext::FraudDetection {
            fraud_score: Some(score),
            ..
        } = &self.context
        {
            if !(0.0..=1.0).contains(score) {
                return Err(GuardianError::InvalidInput(format!(
                    "fraud_score {score} outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_roundtrips_with_tagged_event_type() {
        let event = AgentEvent::new(
            "financial-guardian",
            Severity::High,
            Audience::Operator,
            EventContext::FraudDetection {
                transaction_id: Some("tx_123".to_string()),
                user_id: Some("user_456".to_string()),
                fraud_score: Some(0.95),
                risk_level: Some("HIGH".to_string()),
                action_taken: Some("BLOCK".to_string()),
                red_flags: vec!["amount 12x larger than average".to_string()],
            },
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "fraud_detection");

        let back: AgentEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back.event_type(), EventType::FraudDetection);
        assert_eq!(back.source_agent, "financial-guardian");
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let raw = serde_json::json!({
            "source_agent": "ops-guardian",
            "severity": "low",
            "audience": "operator",
            "event_type": "disk_defrag"
        });
        assert!(serde_json::from_value::<AgentEvent>(raw).is_err());
    }

    #[test]
    fn empty_correlation_id_reads_as_absent() {
        let mut event = AgentEvent::new(
            "ops-guardian",
            Severity::Low,
            Audience::Operator,
            EventContext::Generic { description: None },
        );
        event.correlation_id = Some(String::new());
        assert_eq!(event.correlation_id(), None);

        event.correlation_id = Some("corr-1".to_string());
        assert_eq!(event.correlation_id(), Some("corr-1"));
    }

    #[test]
    fn validation_rejects_blank_source_and_bad_score() {
        let blank = AgentEvent::new(
            "  ",
            Severity::Low,
            Audience::User,
            EventContext::Generic { description: None },
        );
        assert!(blank.validate().is_err());

        let bad_score = AgentEvent::new(
            "financial-guardian",
            Severity::High,
            Audience::Operator,
            EventContext::FraudDetection {
                transaction_id: None,
                user_id: None,
                fraud_score: Some(1.5),
                risk_level: None,
                action_taken: None,
                red_flags: vec![],
            },
        );
        assert!(bad_score.validate().is_err());
    }
}
