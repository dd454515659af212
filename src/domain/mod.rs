//! Core value objects shared across the engine

pub mod agent;
pub mod event;
pub mod explanation;
pub mod scaling;

pub use agent::{AgentState, AgentStatus};
pub use event::{AgentEvent, Audience, EventContext, EventType, Severity};
pub use explanation::{Explanation, ExplanationPayload, ExplanationType};
pub use scaling::{ScalingDecision, ScalingVerdict, ServiceMetrics};
