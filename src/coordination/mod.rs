//! Cross-agent coordination — per-domain pause/resume flags

pub mod state;

pub use state::{CoordinationRegistry, DomainState};
