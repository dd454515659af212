//! HTTP-backed collaborator implementations

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{AgentEvent, ScalingVerdict};
use crate::error::{GuardianError, PredictError, Result};

use super::traits::{ClusterApi, InvestigationSource, Notifier, PredictionContext, Predictor};

/// Prediction over a hosted model endpoint.
///
/// The endpoint receives the serialized [`PredictionContext`] and answers
/// with a JSON verdict, possibly wrapped in a markdown code fence. Fence
/// stripping and parsing happen here, inside the Predict boundary; the
/// caller only ever sees a typed verdict or a typed error.
pub struct HttpPredictor {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpPredictor {
    pub fn new(url: &str, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl Predictor for HttpPredictor {
    async fn predict(
        &self,
        ctx: &PredictionContext,
    ) -> std::result::Result<ScalingVerdict, PredictError> {
        let mut request = self.client.post(&self.url).json(ctx);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PredictError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PredictError::Transport(format!(
                "model endpoint returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PredictError::Transport(e.to_string()))?;

        let verdict: ScalingVerdict = serde_json::from_str(strip_code_fences(&body))
            .map_err(|e| PredictError::Malformed(e.to_string()))?;

        if let Some(confidence) = verdict.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(PredictError::OutOfRange {
                    field: "confidence",
                    value: confidence,
                });
            }
        }

        debug!(service = %ctx.metrics.service_name, should_scale = verdict.should_scale, "model verdict received");
        Ok(verdict)
    }
}

/// Strip a markdown ```json fence if the model wrapped its answer in one
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(start) = trimmed.find("```json") {
        let inner = &trimmed[start + 7..];
        if let Some(end) = inner.find("```") {
            return inner[..end].trim();
        }
    }
    trimmed
}

#[derive(Debug, Deserialize)]
struct AlertFeed {
    #[serde(default)]
    alerts: Vec<Alert>,
}

#[derive(Debug, Deserialize)]
struct Alert {
    #[serde(default)]
    priority: String,
}

/// Counts active fraud investigations from the fraud agent's alert feed.
/// High-priority alerts count as active investigations.
pub struct HttpInvestigations {
    client: Client,
    url: String,
}

impl HttpInvestigations {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl InvestigationSource for HttpInvestigations {
    async fn count_active(&self) -> Result<usize> {
        let feed: AlertFeed = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(feed.alerts.iter().filter(|a| a.priority == "high").count())
    }
}

#[derive(Debug, Deserialize)]
struct ReplicaStatus {
    replicas: u32,
}

/// Replica reads and mutations against a cluster-manager endpoint
pub struct HttpCluster {
    client: Client,
    base_url: String,
}

impl HttpCluster {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ClusterApi for HttpCluster {
    async fn replica_count(&self, service: &str) -> Result<u32> {
        let status: ReplicaStatus = self
            .client
            .get(format!("{}/services/{}/replicas", self.base_url, service))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(status.replicas)
    }

    async fn apply_replica_count(&self, service: &str, target: u32) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/services/{}/scale", self.base_url, service))
            .json(&serde_json::json!({ "replicas": target }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GuardianError::Cluster(format!(
                "scale of {service} to {target} replicas rejected: {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Posts events to a peer agent's ingestion endpoint. Fire-and-forget:
/// failures are logged and swallowed.
pub struct HttpNotifier {
    client: Client,
    url: String,
}

impl HttpNotifier {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, event: AgentEvent) {
        let result = self.client.post(&self.url).json(&event).send().await;
        match result {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "notification rejected");
            }
            Err(e) => warn!(error = %e, "notification failed"),
            Ok(_) => {}
        }
    }
}
