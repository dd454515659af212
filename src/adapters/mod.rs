//! External collaborators — trait seams and their implementations
//!
//! The engine treats every collaborator as a black box with a narrow
//! contract. HTTP-backed implementations live here next to the in-process
//! stand-ins used for dry runs and tests.

pub mod http;
pub mod simulated;
pub mod traits;

pub use http::{HttpCluster, HttpInvestigations, HttpNotifier, HttpPredictor};
pub use simulated::{LocalNotifier, SimulatedCluster, SimulatedMetricsSource, StaticInvestigations};
pub use traits::{ClusterApi, InvestigationSource, MetricsSource, Notifier, PredictionContext, Predictor};
