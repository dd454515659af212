//! HTTP API over the core operations
//!
//! The wire format lives here; the semantics are the core's. Invalid input
//! maps to 400, everything else the core surfaces maps to 500 — transient
//! collaborator failures never reach this layer.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::coordination::CoordinationRegistry;
use crate::correlation::CorrelationService;
use crate::domain::{AgentEvent, AgentState, ServiceMetrics};
use crate::error::{GuardianError, Result};
use crate::registry::AgentRegistry;
use crate::scaling::ScalingEngine;

#[derive(Clone)]
pub struct AppState {
    pub correlation: Arc<CorrelationService>,
    pub registry: Arc<AgentRegistry>,
    pub coordination: Arc<CoordinationRegistry>,
    pub engine: Arc<ScalingEngine>,
    pub monitoring_active: Arc<AtomicBool>,
    pub started_at: DateTime<Utc>,
}

struct ApiError(GuardianError);

impl From<GuardianError> for ApiError {
    fn from(err: GuardianError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            GuardianError::InvalidInput(_) | GuardianError::UnknownService(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .route("/healthy", get(healthy))
        .route("/explain/event", post(submit_event))
        .route("/explain/events", post(submit_event_batch))
        .route("/explain/correlations/:id", get(get_correlation))
        .route("/explain/agent-state", post(register_agent_state))
        .route("/explain/agent-states", get(agent_states))
        .route("/scaling/decision", post(scaling_decision))
        .route("/scaling/manual", post(manual_scale))
        .route("/monitoring/status", get(monitoring_status))
        .route("/coordination/:domain/pause", post(pause_domain))
        .route("/coordination/:domain/resume", post(resume_domain))
        .route("/coordination/:domain", get(domain_state))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the shutdown future resolves
pub async fn serve(
    state: AppState,
    port: u16,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| GuardianError::Internal(format!("API server error: {e}")))
}

async fn ready() -> impl IntoResponse {
    Json(json!({ "service": "guardian", "status": "ready" }))
}

async fn healthy(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = (Utc::now() - state.started_at).num_seconds().max(0);
    Json(json!({
        "service": "guardian",
        "status": "healthy",
        "uptime_seconds": uptime,
        "monitoring_active": state.monitoring_active.load(Ordering::SeqCst),
        "active_correlations": state.correlation.active_correlations().await,
        "registered_agents": state.registry.count().await,
    }))
}

async fn submit_event(
    State(state): State<AppState>,
    Json(event): Json<AgentEvent>,
) -> ApiResult<impl IntoResponse> {
    let explanation = state.correlation.submit(event).await?;
    Ok(Json(explanation))
}

async fn submit_event_batch(
    State(state): State<AppState>,
    Json(events): Json<Vec<AgentEvent>>,
) -> ApiResult<impl IntoResponse> {
    let explanation = state.correlation.submit_batch(events).await?;
    Ok(Json(explanation))
}

async fn get_correlation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let events = state.correlation.group_for(&id).await;
    let mut involved_agents: Vec<String> = Vec::new();
    for event in &events {
        if !involved_agents.contains(&event.source_agent) {
            involved_agents.push(event.source_agent.clone());
        }
    }

    Json(json!({
        "correlation_id": id,
        "count": events.len(),
        "involved_agents": involved_agents,
        "events": events,
    }))
}

async fn register_agent_state(
    State(state): State<AppState>,
    Json(agent_state): Json<AgentState>,
) -> ApiResult<impl IntoResponse> {
    if agent_state.agent_name.trim().is_empty() {
        return Err(GuardianError::InvalidInput("agent_name must not be empty".to_string()).into());
    }
    let agent = agent_state.agent_name.clone();
    state.registry.register(agent_state).await;
    Ok(Json(json!({ "status": "registered", "agent": agent })))
}

async fn agent_states(State(state): State<AppState>) -> impl IntoResponse {
    let agents = state.registry.all().await;
    Json(json!({
        "agent_states": agents,
        "buffered_correlations": state.correlation.active_correlations().await,
    }))
}

#[derive(Debug, Deserialize)]
struct DecisionRequest {
    service_name: String,
    /// Snapshot to decide on; measured through the engine when omitted
    #[serde(default)]
    metrics: Option<ServiceMetrics>,
}

async fn scaling_decision(
    State(state): State<AppState>,
    Json(request): Json<DecisionRequest>,
) -> ApiResult<impl IntoResponse> {
    let metrics = match request.metrics {
        Some(metrics) => metrics,
        None => state.engine.measure(&request.service_name).await?,
    };

    let history = state.engine.history_for(&request.service_name).await;
    let decision = state
        .engine
        .get_decision(&request.service_name, &metrics, &history)
        .await?;

    let (paused, _) = state
        .coordination
        .is_paused(state.engine.coordination_domain())
        .await;

    Ok(Json(json!({
        "service": request.service_name,
        "current_metrics": metrics,
        "scaling_decision": decision,
        "will_execute": !paused,
    })))
}

#[derive(Debug, Deserialize)]
struct ManualScaleRequest {
    service_name: String,
    target_replicas: u32,
}

async fn manual_scale(
    State(state): State<AppState>,
    Json(request): Json<ManualScaleRequest>,
) -> ApiResult<impl IntoResponse> {
    let applied = state
        .engine
        .scale_manual(&request.service_name, request.target_replicas)
        .await?;
    Ok(Json(json!({
        "status": "success",
        "service": request.service_name,
        "target_replicas": applied,
    })))
}

async fn monitoring_status(State(state): State<AppState>) -> impl IntoResponse {
    let domain = state.engine.coordination_domain();
    let (paused, reason) = state.coordination.is_paused(domain).await;

    Json(json!({
        "monitoring_active": state.monitoring_active.load(Ordering::SeqCst),
        "coordination_paused": paused,
        "pause_reason": reason,
        "monitored_services": state.engine.monitored_services(),
        "recent_decisions": state.engine.recent_decisions(10).await,
    }))
}

#[derive(Debug, Deserialize, Default)]
struct PauseRequest {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    set_by: Option<String>,
}

async fn pause_domain(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    body: Option<Json<PauseRequest>>,
) -> impl IntoResponse {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let reason = request
        .reason
        .unwrap_or_else(|| "Manual coordination request".to_string());
    let set_by = request.set_by.unwrap_or_else(|| "operator".to_string());

    state.coordination.pause(&domain, &reason, &set_by).await;
    Json(json!({ "status": "paused", "domain": domain, "reason": reason }))
}

async fn resume_domain(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> impl IntoResponse {
    state.coordination.resume(&domain).await;
    Json(json!({ "status": "resumed", "domain": domain }))
}

async fn domain_state(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> impl IntoResponse {
    let (paused, reason) = state.coordination.is_paused(&domain).await;
    Json(json!({ "domain": domain, "paused": paused, "reason": reason }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::traits::{
        MockClusterApi, MockInvestigationSource, MockMetricsSource, MockNotifier,
    };
    use crate::config::ScalingConfig;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let coordination = Arc::new(CoordinationRegistry::new());
        let engine = Arc::new(ScalingEngine::new(
            ScalingConfig::default(),
            None,
            Arc::new(MockInvestigationSource::new()),
            Arc::new(MockClusterApi::new()),
            Arc::new(MockNotifier::new()),
            Arc::new(MockMetricsSource::new()),
            coordination.clone(),
        ));

        AppState {
            correlation: Arc::new(CorrelationService::new(300)),
            registry: Arc::new(AgentRegistry::new()),
            coordination,
            engine,
            monitoring_active: Arc::new(AtomicBool::new(false)),
            started_at: Utc::now(),
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn ready_endpoint_answers() {
        let response = router(test_state())
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn event_submission_round_trips() {
        let payload = json!({
            "source_agent": "financial-guardian",
            "severity": "high",
            "audience": "operator",
            "event_type": "fraud_detection",
            "context": { "fraud_score": 0.95, "action_taken": "BLOCK" }
        });

        let response = router(test_state())
            .oneshot(
                Request::post("/explain/event")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["explanation_type"], "single_agent");
        assert_eq!(body["involved_agents"][0], "financial-guardian");
    }

    #[tokio::test]
    async fn invalid_event_maps_to_bad_request() {
        let payload = json!({
            "source_agent": "  ",
            "severity": "low",
            "audience": "user",
            "event_type": "generic",
            "context": {}
        });

        let response = router(test_state())
            .oneshot(
                Request::post("/explain/event")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pause_and_query_coordination_domain() {
        let app = router(test_state());

        let response = app
            .clone()
            .oneshot(
                Request::post("/coordination/scaling-vs-fraud/pause")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "reason": "r1" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::get("/coordination/scaling-vs-fraud")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["paused"], true);
        assert_eq!(body["reason"], "r1");
    }

    #[tokio::test]
    async fn unknown_service_decision_is_bad_request() {
        let payload = json!({ "service_name": "mystery", "metrics": null });
        let response = router(test_state())
            .oneshot(
                Request::post("/scaling/decision")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
