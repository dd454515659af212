//! The scaling decision engine
//!
//! Each cycle runs Measure -> Predict -> (Arbitrate) -> Execute|Defer|Skip.
//! Predict tries the AI collaborator and falls back to the deterministic
//! rules on any transport failure, malformed response, or out-of-range
//! field. Arbitrate consults the coordination domain's pause flag and the
//! fraud-investigation count; either one independently blocks execution,
//! and each carries its own reportable reason.

use chrono::{FixedOffset, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::adapters::{
    ClusterApi, InvestigationSource, MetricsSource, Notifier, PredictionContext, Predictor,
};
use crate::config::ScalingConfig;
use crate::coordination::CoordinationRegistry;
use crate::domain::{
    AgentEvent, Audience, EventContext, ScalingDecision, ScalingVerdict, Severity, ServiceMetrics,
};
use crate::error::{GuardianError, PredictError, Result};
use crate::scaling::rules;

/// Agent identity this engine reports under
const SOURCE_AGENT: &str = "ops-guardian";
/// Peer agent whose investigations take priority over scaling
const FRAUD_AGENT: &str = "financial-guardian";

const DEFAULT_AI_CONFIDENCE: f64 = 0.7;

/// Why a flagged verdict was deferred instead of executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferReason {
    /// The coordination domain's explicit pause flag is set
    DomainPaused { reason: String },
    /// The fraud agent reports active investigations
    ActiveInvestigations { count: usize },
}

impl std::fmt::Display for DeferReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeferReason::DomainPaused { reason } => {
                write!(f, "coordination domain paused: {reason}")
            }
            DeferReason::ActiveInvestigations { count } => {
                write!(f, "{count} active fraud investigations take priority")
            }
        }
    }
}

/// Terminal state of one decision cycle
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// The cluster mutation was applied
    Executed(ScalingDecision),
    /// Arbitration blocked execution; a notification was emitted instead
    Deferred {
        decision: ScalingDecision,
        reason: DeferReason,
    },
    /// Nothing to do (hold verdict) or the mutation failed and was logged
    Skipped,
}

pub struct ScalingEngine {
    config: ScalingConfig,
    reference_tz: FixedOffset,
    /// `None` runs every cycle straight on the rules
    predictor: Option<Arc<dyn Predictor>>,
    investigations: Arc<dyn InvestigationSource>,
    cluster: Arc<dyn ClusterApi>,
    notifier: Arc<dyn Notifier>,
    metrics_source: Arc<dyn MetricsSource>,
    coordination: Arc<CoordinationRegistry>,
    history: RwLock<HashMap<String, VecDeque<ServiceMetrics>>>,
    decisions: RwLock<VecDeque<ScalingDecision>>,
}

impl ScalingEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: ScalingConfig,
        predictor: Option<Arc<dyn Predictor>>,
        investigations: Arc<dyn InvestigationSource>,
        cluster: Arc<dyn ClusterApi>,
        notifier: Arc<dyn Notifier>,
        metrics_source: Arc<dyn MetricsSource>,
        coordination: Arc<CoordinationRegistry>,
    ) -> Self {
        let reference_tz = FixedOffset::east_opt(config.utc_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));
        Self {
            config,
            reference_tz,
            predictor,
            investigations,
            cluster,
            notifier,
            metrics_source,
            coordination,
            history: RwLock::new(HashMap::new()),
            decisions: RwLock::new(VecDeque::new()),
        }
    }

    pub fn monitored_services(&self) -> &[String] {
        &self.config.monitored_services
    }

    pub fn coordination_domain(&self) -> &str {
        &self.config.coordination_domain
    }

    fn is_monitored(&self, service: &str) -> bool {
        self.config
            .monitored_services
            .iter()
            .any(|s| s == service)
    }

    /// Public decision operation: verdict only, no execution. Unknown
    /// services are rejected.
    pub async fn get_decision(
        &self,
        service: &str,
        metrics: &ServiceMetrics,
        history: &[ServiceMetrics],
    ) -> Result<ScalingDecision> {
        if !self.is_monitored(service) {
            return Err(GuardianError::UnknownService(service.to_string()));
        }
        Ok(self.decide(metrics, history).await)
    }

    /// The Predict step: AI-assisted with deterministic rule fallback
    pub async fn decide(
        &self,
        metrics: &ServiceMetrics,
        history: &[ServiceMetrics],
    ) -> ScalingDecision {
        let local_now = Utc::now().with_timezone(&self.reference_tz);

        let Some(predictor) = &self.predictor else {
            debug!(service = %metrics.service_name, "no predictor configured, using rules");
            return rules::decide(
                metrics,
                local_now,
                self.config.min_replicas,
                self.config.max_replicas,
            );
        };

        let business_hours = rules::is_business_hours(local_now);
        let recent: Vec<ServiceMetrics> = history.iter().rev().take(5).rev().cloned().collect();
        let ctx = PredictionContext::new(metrics.clone(), local_now, business_hours, recent);

        let predict_timeout = Duration::from_millis(self.config.predict_timeout_ms);
        let verdict = match tokio::time::timeout(predict_timeout, predictor.predict(&ctx)).await {
            Ok(Ok(verdict)) => self.accept_verdict(metrics, verdict),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PredictError::Timeout {
                elapsed_ms: self.config.predict_timeout_ms,
            }),
        };

        match verdict {
            Ok(decision) => decision,
            Err(e) => {
                warn!(
                    service = %metrics.service_name,
                    error = %e,
                    "AI prediction unavailable, falling back to rules"
                );
                rules::decide(
                    metrics,
                    local_now,
                    self.config.min_replicas,
                    self.config.max_replicas,
                )
            }
        }
    }

    /// Turn a raw model verdict into a decision. Confidence outside [0, 1]
    /// rejects the verdict entirely (rules take over); an accepted target is
    /// clamped into the replica bounds regardless of what the model said.
    fn accept_verdict(
        &self,
        metrics: &ServiceMetrics,
        verdict: ScalingVerdict,
    ) -> std::result::Result<ScalingDecision, PredictError> {
        if let Some(confidence) = verdict.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(PredictError::OutOfRange {
                    field: "confidence",
                    value: confidence,
                });
            }
        }

        let target_replicas = if verdict.should_scale {
            verdict
                .target_replicas
                .unwrap_or(metrics.current_replicas)
                .clamp(self.config.min_replicas, self.config.max_replicas)
        } else {
            metrics.current_replicas
        };

        Ok(ScalingDecision {
            service_name: metrics.service_name.clone(),
            current_replicas: metrics.current_replicas,
            target_replicas,
            reason: verdict
                .reason
                .unwrap_or_else(|| "AI-based scaling decision".to_string()),
            confidence: verdict.confidence.unwrap_or(DEFAULT_AI_CONFIDENCE),
            coordination_needed: verdict.coordination_needed.unwrap_or(false),
            estimated_impact: verdict
                .estimated_impact
                .unwrap_or_else(|| "Improved performance expected".to_string()),
            timestamp: Utc::now(),
        })
    }

    /// Arbitrate and act on a decision
    pub async fn execute(&self, decision: ScalingDecision) -> CycleOutcome {
        if decision.is_hold() {
            debug!(service = %decision.service_name, "hold verdict, nothing to execute");
            return CycleOutcome::Skipped;
        }

        if decision.coordination_needed {
            if let Some(reason) = self.arbitrate().await {
                info!(
                    service = %decision.service_name,
                    reason = %reason,
                    "scaling deferred by arbitration"
                );
                self.notify_deferred(&decision, &reason).await;
                return CycleOutcome::Deferred { decision, reason };
            }
        }

        let apply_timeout = Duration::from_millis(self.config.collaborator_timeout_ms);
        let applied = tokio::time::timeout(
            apply_timeout,
            self.cluster
                .apply_replica_count(&decision.service_name, decision.target_replicas),
        )
        .await;

        match applied {
            Ok(Ok(())) => {
                info!(
                    service = %decision.service_name,
                    from = decision.current_replicas,
                    to = decision.target_replicas,
                    "scaling executed"
                );
                self.record_decision(decision.clone()).await;
                self.notify_executed(&decision).await;
                CycleOutcome::Executed(decision)
            }
            Ok(Err(e)) => {
                error!(service = %decision.service_name, error = %e, "scale apply failed, skipping cycle");
                CycleOutcome::Skipped
            }
            Err(_) => {
                error!(
                    service = %decision.service_name,
                    timeout_ms = self.config.collaborator_timeout_ms,
                    "scale apply timed out, skipping cycle"
                );
                CycleOutcome::Skipped
            }
        }
    }

    /// The priority check. Returns the blocking reason, if any. The pause
    /// flag and the investigation count block independently.
    async fn arbitrate(&self) -> Option<DeferReason> {
        let (paused, reason) = self
            .coordination
            .is_paused(&self.config.coordination_domain)
            .await;
        if paused {
            return Some(DeferReason::DomainPaused { reason });
        }

        let count = self.active_investigations().await;
        if count > 0 {
            return Some(DeferReason::ActiveInvestigations { count });
        }

        None
    }

    /// Investigation count with the collaborator timeout applied. An
    /// unreachable fraud agent counts as zero investigations.
    async fn active_investigations(&self) -> usize {
        let timeout = Duration::from_millis(self.config.collaborator_timeout_ms);
        match tokio::time::timeout(timeout, self.investigations.count_active()).await {
            Ok(Ok(count)) => count,
            Ok(Err(e)) => {
                warn!(error = %e, "could not check fraud investigations");
                0
            }
            Err(_) => {
                warn!("fraud investigation check timed out");
                0
            }
        }
    }

    /// Current metrics for a monitored service, with the collaborator
    /// timeout applied
    pub async fn measure(&self, service: &str) -> Result<ServiceMetrics> {
        if !self.is_monitored(service) {
            return Err(GuardianError::UnknownService(service.to_string()));
        }
        let timeout = Duration::from_millis(self.config.collaborator_timeout_ms);
        match tokio::time::timeout(timeout, self.metrics_source.service_metrics(service)).await {
            Ok(result) => result,
            Err(_) => Err(GuardianError::ComponentFailure {
                component: "metrics".to_string(),
                reason: format!("metrics fetch for {service} timed out"),
            }),
        }
    }

    /// One full monitoring pass over every monitored service. While the
    /// coordination domain is paused, metrics are still collected but no
    /// decisions are made.
    pub async fn run_monitor_pass(&self) {
        let (paused, _) = self
            .coordination
            .is_paused(&self.config.coordination_domain)
            .await;

        for service in &self.config.monitored_services {
            let metrics = match self.measure(service).await {
                Ok(metrics) => metrics,
                Err(e) => {
                    warn!(service = %service, error = %e, "could not fetch metrics");
                    continue;
                }
            };

            self.record_metrics(metrics.clone()).await;

            if paused {
                continue;
            }

            let history = self.history_for(service).await;
            let decision = self.decide(&metrics, &history).await;
            self.execute(decision).await;
        }
    }

    /// Clamp and apply an operator-requested replica count
    pub async fn scale_manual(&self, service: &str, target: u32) -> Result<u32> {
        if !self.is_monitored(service) {
            return Err(GuardianError::UnknownService(service.to_string()));
        }

        let target = target.clamp(self.config.min_replicas, self.config.max_replicas);
        let current = self.cluster.replica_count(service).await.unwrap_or(target);
        self.cluster.apply_replica_count(service, target).await?;

        info!(service, target, "manual scaling applied");
        self.notifier
            .notify(
                AgentEvent::new(
                    SOURCE_AGENT,
                    Severity::Medium,
                    Audience::Operator,
                    EventContext::SystemScaling {
                        service_name: Some(service.to_string()),
                        from_replicas: Some(current),
                        to_replicas: Some(target),
                        trigger: Some("manual operator request".to_string()),
                        prediction_confidence: None,
                        estimated_duration: None,
                    },
                ),
            )
            .await;

        Ok(target)
    }

    pub async fn record_metrics(&self, metrics: ServiceMetrics) {
        let mut history = self.history.write().await;
        let entry = history
            .entry(metrics.service_name.clone())
            .or_insert_with(VecDeque::new);
        entry.push_back(metrics);
        while entry.len() > self.config.history_limit {
            entry.pop_front();
        }
    }

    pub async fn history_for(&self, service: &str) -> Vec<ServiceMetrics> {
        let history = self.history.read().await;
        history
            .get(service)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn record_decision(&self, decision: ScalingDecision) {
        let mut decisions = self.decisions.write().await;
        decisions.push_back(decision);
        while decisions.len() > self.config.decision_history_limit {
            decisions.pop_front();
        }
    }

    /// Most recent executed decisions, newest last
    pub async fn recent_decisions(&self, limit: usize) -> Vec<ScalingDecision> {
        let decisions = self.decisions.read().await;
        decisions
            .iter()
            .rev()
            .take(limit)
            .rev()
            .cloned()
            .collect()
    }

    async fn notify_executed(&self, decision: &ScalingDecision) {
        self.notifier
            .notify(
                AgentEvent::new(
                    SOURCE_AGENT,
                    Severity::Medium,
                    Audience::Operator,
                    EventContext::SystemScaling {
                        service_name: Some(decision.service_name.clone()),
                        from_replicas: Some(decision.current_replicas),
                        to_replicas: Some(decision.target_replicas),
                        trigger: Some(decision.reason.clone()),
                        prediction_confidence: Some(decision.confidence),
                        estimated_duration: None,
                    },
                ),
            )
            .await;
    }

    async fn notify_deferred(&self, decision: &ScalingDecision, reason: &DeferReason) {
        self.notifier
            .notify(
                AgentEvent::new(
                    SOURCE_AGENT,
                    Severity::Medium,
                    Audience::Operator,
                    EventContext::AgentCoordination {
                        coordination_type: Some("scaling_deferred".to_string()),
                        involved_agents: vec![FRAUD_AGENT.to_string(), SOURCE_AGENT.to_string()],
                        decision: Some(format!(
                            "Deferred scaling of {} from {} to {} replicas",
                            decision.service_name,
                            decision.current_replicas,
                            decision.target_replicas
                        )),
                        reasoning: Some(reason.to_string()),
                        estimated_duration: None,
                    },
                ),
            )
            .await;
    }
}
