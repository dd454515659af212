//! Service surface — the HTTP layer over the core operations

pub mod api;

pub use api::{router, serve, AppState};
