//! In-process collaborator stand-ins for dry runs and tests

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::correlation::CorrelationService;
use crate::domain::{AgentEvent, ServiceMetrics};
use crate::error::{GuardianError, Result};

use super::traits::{ClusterApi, InvestigationSource, MetricsSource, Notifier};

/// Cluster stand-in holding replica counts in memory
#[derive(Default)]
pub struct SimulatedCluster {
    replicas: RwLock<HashMap<String, u32>>,
}

impl SimulatedCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, service: &str, replicas: u32) {
        self.replicas
            .write()
            .await
            .insert(service.to_string(), replicas);
    }
}

#[async_trait]
impl ClusterApi for SimulatedCluster {
    async fn replica_count(&self, service: &str) -> Result<u32> {
        self.replicas
            .read()
            .await
            .get(service)
            .copied()
            .ok_or_else(|| GuardianError::UnknownService(service.to_string()))
    }

    async fn apply_replica_count(&self, service: &str, target: u32) -> Result<()> {
        self.replicas
            .write()
            .await
            .insert(service.to_string(), target);
        Ok(())
    }
}

/// Synthetic metrics source for running the engine without a metrics feed.
/// Load figures wander within plausible ranges; replica counts come from
/// the cluster so scale actions feed back into the next cycle.
pub struct SimulatedMetricsSource {
    cluster: Arc<dyn ClusterApi>,
}

impl SimulatedMetricsSource {
    pub fn new(cluster: Arc<dyn ClusterApi>) -> Self {
        Self { cluster }
    }
}

#[async_trait]
impl MetricsSource for SimulatedMetricsSource {
    async fn service_metrics(&self, service: &str) -> Result<ServiceMetrics> {
        let replicas = self.cluster.replica_count(service).await.unwrap_or(1);

        let mut rng = rand::thread_rng();
        let cpu_usage: f64 = rng.gen_range(10.0..85.0);
        let memory_usage: f64 = rng.gen_range(15.0..90.0);
        let response_time_avg = 100.0 + (cpu_usage - 50.0) * 2.0;
        let request_rate: f64 = rng.gen_range(10.0..150.0);
        let error_rate = if cpu_usage > 70.0 {
            ((cpu_usage - 70.0) * 0.5).min(5.0)
        } else {
            0.0
        };

        Ok(ServiceMetrics {
            service_name: service.to_string(),
            cpu_usage,
            memory_usage,
            current_replicas: replicas,
            desired_replicas: replicas,
            response_time_avg,
            request_rate,
            error_rate,
            timestamp: Utc::now(),
        })
    }
}

/// Fixed investigation count, adjustable at runtime. The zero-count default
/// is the stand-in used when no fraud agent is wired up.
#[derive(Default)]
pub struct StaticInvestigations {
    count: AtomicUsize,
}

impl StaticInvestigations {
    pub fn new(count: usize) -> Self {
        let investigations = Self::default();
        investigations.count.store(count, Ordering::SeqCst);
        investigations
    }

    pub fn set(&self, count: usize) {
        self.count.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl InvestigationSource for StaticInvestigations {
    async fn count_active(&self) -> Result<usize> {
        Ok(self.count.load(Ordering::SeqCst))
    }
}

/// Routes notifications straight into the local correlation service, so
/// engine-emitted events join the same incident timeline as agent
/// submissions. Submission errors are logged and swallowed.
pub struct LocalNotifier {
    correlation: Arc<CorrelationService>,
}

impl LocalNotifier {
    pub fn new(correlation: Arc<CorrelationService>) -> Self {
        Self { correlation }
    }
}

#[async_trait]
impl Notifier for LocalNotifier {
    async fn notify(&self, event: AgentEvent) {
        if let Err(e) = self.correlation.submit(event).await {
            warn!(error = %e, "local notification dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_cluster_applies_and_reads_back() {
        let cluster = SimulatedCluster::new();
        cluster.seed("frontend", 2).await;

        cluster.apply_replica_count("frontend", 5).await.unwrap();
        assert_eq!(cluster.replica_count("frontend").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn unknown_service_read_is_an_error() {
        let cluster = SimulatedCluster::new();
        assert!(matches!(
            cluster.replica_count("nope").await,
            Err(GuardianError::UnknownService(_))
        ));
    }

    #[tokio::test]
    async fn simulated_metrics_stay_in_plausible_ranges() {
        let cluster = Arc::new(SimulatedCluster::new());
        cluster.seed("frontend", 3).await;
        let source = SimulatedMetricsSource::new(cluster);

        let metrics = source.service_metrics("frontend").await.unwrap();
        assert!((10.0..=85.0).contains(&metrics.cpu_usage));
        assert!((0.0..=5.0).contains(&metrics.error_rate));
        assert_eq!(metrics.current_replicas, 3);
    }

    #[tokio::test]
    async fn static_investigations_can_be_adjusted() {
        let investigations = StaticInvestigations::new(0);
        assert_eq!(investigations.count_active().await.unwrap(), 0);
        investigations.set(2);
        assert_eq!(investigations.count_active().await.unwrap(), 2);
    }
}
