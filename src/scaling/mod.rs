//! Scaling decision engine — measure, predict, arbitrate, act

pub mod engine;
pub mod monitor;
pub mod rules;

pub use engine::{CycleOutcome, DeferReason, ScalingEngine};
pub use monitor::{MonitorHandle, ScalingMonitor};
