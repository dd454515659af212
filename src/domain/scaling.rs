//! Scaling value objects — metrics snapshots and verdicts
//!
//! Both are recomputed each cycle and retained only in bounded rolling
//! history, never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time metrics snapshot for one monitored service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceMetrics {
    pub service_name: String,
    /// CPU usage percent (0-100)
    pub cpu_usage: f64,
    /// Memory usage percent (0-100)
    pub memory_usage: f64,
    pub current_replicas: u32,
    pub desired_replicas: u32,
    /// Average response time in milliseconds
    pub response_time_avg: f64,
    /// Requests per second
    pub request_rate: f64,
    /// Error rate percent
    pub error_rate: f64,
    pub timestamp: DateTime<Utc>,
}

/// The engine's verdict for one service and one cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingDecision {
    pub service_name: String,
    pub current_replicas: u32,
    pub target_replicas: u32,
    pub reason: String,
    /// Confidence in the verdict, in [0, 1]
    pub confidence: f64,
    /// Execution must first clear cross-agent arbitration
    pub coordination_needed: bool,
    pub estimated_impact: String,
    pub timestamp: DateTime<Utc>,
}

impl ScalingDecision {
    /// A decision whose target equals the current replica count mutates
    /// nothing and notifies no one.
    pub fn is_hold(&self) -> bool {
        self.target_replicas == self.current_replicas
    }

    /// Hold verdict for metrics inside all thresholds
    pub fn hold(metrics: &ServiceMetrics, reason: &str, confidence: f64) -> Self {
        Self {
            service_name: metrics.service_name.clone(),
            current_replicas: metrics.current_replicas,
            target_replicas: metrics.current_replicas,
            reason: reason.to_string(),
            confidence,
            coordination_needed: false,
            estimated_impact: "No change expected".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Structured verdict returned by the AI prediction boundary. Raw model
/// fields, before the engine clamps them into valid ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingVerdict {
    pub should_scale: bool,
    #[serde(default)]
    pub target_replicas: Option<u32>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub coordination_needed: Option<bool>,
    #[serde(default)]
    pub estimated_impact: Option<String>,
}
