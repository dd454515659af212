use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub correlation: CorrelationConfig,
    #[serde(default)]
    pub scaling: ScalingConfig,
    #[serde(default)]
    pub collaborators: CollaboratorConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorrelationConfig {
    /// Sliding window within which events sharing a correlation id are one
    /// incident (seconds)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_window_secs() -> u64 {
    300
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScalingConfig {
    /// Services the monitoring loop measures and may scale
    #[serde(default = "default_monitored_services")]
    pub monitored_services: Vec<String>,
    /// Seconds between monitoring cycles
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval_secs: u64,
    /// Replica floor applied to every verdict
    #[serde(default = "default_min_replicas")]
    pub min_replicas: u32,
    /// Replica cap applied to every verdict
    #[serde(default = "default_max_replicas")]
    pub max_replicas: u32,
    /// Coordination domain consulted before executing flagged verdicts
    #[serde(default = "default_coordination_domain")]
    pub coordination_domain: String,
    /// Fixed offset from UTC for the services' reference timezone (hours)
    #[serde(default)]
    pub utc_offset_hours: i32,
    /// Timeout for a single AI prediction call (milliseconds)
    #[serde(default = "default_predict_timeout")]
    pub predict_timeout_ms: u64,
    /// Timeout for cluster and investigation collaborator calls (milliseconds)
    #[serde(default = "default_collaborator_timeout")]
    pub collaborator_timeout_ms: u64,
    /// Most-recent-N metrics snapshots kept per service
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Most-recent-N executed decisions kept
    #[serde(default = "default_decision_history_limit")]
    pub decision_history_limit: usize,
    /// Start with the coordination domain paused (scaling decisions are
    /// still computed and reportable, never executed)
    #[serde(default = "default_start_paused")]
    pub start_paused: bool,
}

fn default_monitored_services() -> Vec<String> {
    [
        "frontend",
        "balancereader",
        "ledgerwriter",
        "transactionhistory",
        "userservice",
        "contacts",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_monitor_interval() -> u64 {
    30
}

fn default_min_replicas() -> u32 {
    1
}

fn default_max_replicas() -> u32 {
    10
}

fn default_coordination_domain() -> String {
    "scaling-vs-fraud".to_string()
}

fn default_predict_timeout() -> u64 {
    10_000
}

fn default_collaborator_timeout() -> u64 {
    5_000
}

fn default_history_limit() -> usize {
    100
}

fn default_decision_history_limit() -> usize {
    50
}

fn default_start_paused() -> bool {
    true
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            monitored_services: default_monitored_services(),
            monitor_interval_secs: default_monitor_interval(),
            min_replicas: default_min_replicas(),
            max_replicas: default_max_replicas(),
            coordination_domain: default_coordination_domain(),
            utc_offset_hours: 0,
            predict_timeout_ms: default_predict_timeout(),
            collaborator_timeout_ms: default_collaborator_timeout(),
            history_limit: default_history_limit(),
            decision_history_limit: default_decision_history_limit(),
            start_paused: default_start_paused(),
        }
    }
}

/// Endpoints for the external collaborators. Any endpoint left empty disables
/// the HTTP implementation; the engine then runs on its built-in stand-ins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollaboratorConfig {
    /// Model endpoint for AI-assisted scaling verdicts
    #[serde(default)]
    pub model_url: Option<String>,
    /// API key sent to the model endpoint
    #[serde(default)]
    pub model_api_key: Option<String>,
    /// Fraud-investigation alert feed (high-priority alerts are counted as
    /// active investigations)
    #[serde(default)]
    pub investigations_url: Option<String>,
    /// Cluster manager endpoint for replica mutations
    #[serde(default)]
    pub cluster_url: Option<String>,
    /// Fire-and-forget agent notification endpoint
    #[serde(default)]
    pub notify_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    #[serde(default = "default_api_port")]
    pub port: u16,
}

fn default_api_port() -> u16 {
    8082
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_api_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Directory for daily rolling log files (stdout only when unset)
    #[serde(default)]
    pub dir: Option<String>,
    /// Emit JSON-formatted log lines
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    /// Load configuration from a file plus `GUARDIAN_`-prefixed environment
    /// overrides (e.g. `GUARDIAN_API__PORT=9000`)
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("GUARDIAN")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AppConfig::load("does-not-exist.toml").expect("defaults load");
        assert_eq!(cfg.correlation.window_secs, 300);
        assert_eq!(cfg.scaling.monitor_interval_secs, 30);
        assert_eq!(cfg.scaling.min_replicas, 1);
        assert_eq!(cfg.scaling.max_replicas, 10);
        assert_eq!(cfg.scaling.coordination_domain, "scaling-vs-fraud");
        assert!(cfg.scaling.start_paused);
        assert_eq!(cfg.api.port, 8082);
    }
}
