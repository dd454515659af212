//! Collaborator trait seams consumed by the engine

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::domain::{AgentEvent, ScalingVerdict, ServiceMetrics};
use crate::error::{PredictError, Result};

/// Context handed to the AI-assisted prediction boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionContext {
    pub metrics: ServiceMetrics,
    pub hour_of_day: u32,
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
    pub is_business_hours: bool,
    /// Most recent snapshots, oldest first (bounded by the engine)
    pub recent_history: Vec<ServiceMetrics>,
}

impl PredictionContext {
    pub fn new(
        metrics: ServiceMetrics,
        local_now: DateTime<FixedOffset>,
        is_business_hours: bool,
        recent_history: Vec<ServiceMetrics>,
    ) -> Self {
        use chrono::{Datelike, Timelike};
        Self {
            metrics,
            hour_of_day: local_now.hour(),
            day_of_week: local_now.weekday().num_days_from_monday(),
            is_business_hours,
            recent_history,
        }
    }
}

/// AI-assisted scaling prediction. Any implementation satisfying this
/// signature is acceptable; all parse-or-fallback logic lives behind it and
/// comes out as a typed result-or-error.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, ctx: &PredictionContext) -> std::result::Result<ScalingVerdict, PredictError>;
}

/// Count of currently active fraud investigations. A nonzero count defers
/// any scaling verdict flagged for coordination.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InvestigationSource: Send + Sync {
    async fn count_active(&self) -> Result<usize>;
}

/// Cluster replica reads and mutations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn replica_count(&self, service: &str) -> Result<u32>;
    async fn apply_replica_count(&self, service: &str, target: u32) -> Result<()>;
}

/// Point-in-time metrics for a monitored service
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn service_metrics(&self, service: &str) -> Result<ServiceMetrics>;
}

/// Fire-and-forget agent notification. Errors are logged by the
/// implementation and never retried, never propagated.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: AgentEvent);
}
