pub mod adapters;
pub mod config;
pub mod coordination;
pub mod correlation;
pub mod domain;
pub mod error;
pub mod explain;
pub mod registry;
pub mod scaling;
pub mod services;

pub use adapters::{
    ClusterApi, HttpCluster, HttpInvestigations, HttpNotifier, HttpPredictor, InvestigationSource,
    LocalNotifier, MetricsSource, Notifier, PredictionContext, Predictor, SimulatedCluster,
    SimulatedMetricsSource, StaticInvestigations,
};
pub use config::AppConfig;
pub use coordination::{CoordinationRegistry, DomainState};
pub use correlation::{CorrelationService, EventStore};
pub use domain::{
    AgentEvent, AgentState, AgentStatus, Audience, EventContext, EventType, Explanation,
    ExplanationPayload, ExplanationType, ScalingDecision, ScalingVerdict, Severity, ServiceMetrics,
};
pub use error::{GuardianError, PredictError, Result};
pub use registry::AgentRegistry;
pub use scaling::{CycleOutcome, DeferReason, MonitorHandle, ScalingEngine, ScalingMonitor};
pub use services::AppState;
