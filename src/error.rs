use thiserror::Error;

/// Main error type for the coordination engine
#[derive(Error, Debug)]
pub enum GuardianError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Input validation errors, surfaced synchronously to callers
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    // Collaborator errors
    #[error("Cluster operation failed: {0}")]
    Cluster(String),

    #[error("Component failure: {component} - {reason}")]
    ComponentFailure { component: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for GuardianError
pub type Result<T> = std::result::Result<T, GuardianError>;

/// Failure classes for the AI-assisted prediction boundary.
///
/// Every variant is recovered locally by the rule-based fallback and never
/// surfaced past the scaling engine.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("prediction transport failed: {0}")]
    Transport(String),

    #[error("prediction timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("malformed prediction response: {0}")]
    Malformed(String),

    #[error("prediction field out of range: {field} = {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

impl From<PredictError> for GuardianError {
    fn from(err: PredictError) -> Self {
        GuardianError::ComponentFailure {
            component: "predictor".to_string(),
            reason: err.to_string(),
        }
    }
}
