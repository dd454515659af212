//! Background monitoring loop
//!
//! A ticker-driven tokio task that runs one engine pass per interval. Stop
//! requests are observed only at cycle boundaries: an in-flight pass always
//! completes, then the loop exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::scaling::ScalingEngine;

pub struct ScalingMonitor {
    engine: Arc<ScalingEngine>,
    interval: Duration,
}

impl ScalingMonitor {
    pub fn new(engine: Arc<ScalingEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Spawn the loop. The returned handle stops it and reports liveness.
    pub fn spawn(self) -> MonitorHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let running = Arc::new(AtomicBool::new(true));
        let running_flag = running.clone();

        let handle = tokio::spawn(async move {
            info!(interval_secs = self.interval.as_secs(), "scaling monitor started");
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick fires immediately; skip it so a fresh monitor
            // waits one full interval before its first pass.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.engine.run_monitor_pass().await;
                    }
                    result = stop_rx.changed() => {
                        if result.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            running_flag.store(false, Ordering::SeqCst);
            info!("scaling monitor stopped");
        });

        MonitorHandle {
            stop_tx,
            running,
            handle,
        }
    }
}

pub struct MonitorHandle {
    stop_tx: watch::Sender<bool>,
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Shared liveness flag, readable after the handle is consumed
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Request a stop and wait for the loop to exit. Completes within one
    /// cycle boundary of the request.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "monitor task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::traits::{
        MockClusterApi, MockInvestigationSource, MockMetricsSource, MockNotifier,
    };
    use crate::config::ScalingConfig;
    use crate::coordination::CoordinationRegistry;

    fn idle_engine() -> Arc<ScalingEngine> {
        let mut config = ScalingConfig::default();
        config.monitored_services = vec![];
        Arc::new(ScalingEngine::new(
            config,
            None,
            Arc::new(MockInvestigationSource::new()),
            Arc::new(MockClusterApi::new()),
            Arc::new(MockNotifier::new()),
            Arc::new(MockMetricsSource::new()),
            Arc::new(CoordinationRegistry::new()),
        ))
    }

    #[tokio::test]
    async fn monitor_stops_on_request() {
        let monitor = ScalingMonitor::new(idle_engine(), Duration::from_secs(3600));
        let handle = monitor.spawn();

        assert!(handle.is_running());
        handle.stop().await;
    }

    #[tokio::test]
    async fn monitor_ticks_run_engine_passes() {
        let mut config = ScalingConfig::default();
        config.monitored_services = vec!["frontend".to_string()];

        let mut metrics_source = MockMetricsSource::new();
        metrics_source
            .expect_service_metrics()
            .times(1..)
            .returning(|_| Err(crate::error::GuardianError::Internal("no metrics".to_string())));

        let engine = Arc::new(ScalingEngine::new(
            config,
            None,
            Arc::new(MockInvestigationSource::new()),
            Arc::new(MockClusterApi::new()),
            Arc::new(MockNotifier::new()),
            Arc::new(metrics_source),
            Arc::new(CoordinationRegistry::new()),
        ));

        let handle = ScalingMonitor::new(engine, Duration::from_millis(10)).spawn();
        // The failing metrics source shows passes ran without touching
        // the other collaborators; the times(1..) expectation verifies
        // at least one tick fired.
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.stop().await;
    }
}
