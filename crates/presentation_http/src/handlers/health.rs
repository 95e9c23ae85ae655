//! Liveness endpoint

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Liveness document with a glimpse of engine state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether randomness is seeded, i.e. runs are reproducible
    pub seeded: bool,
    /// Latency/failure injections served so far
    pub injections: u64,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        seeded: state.config.simulation.seed.is_some(),
        injections: state.simulation.injection_stats().total_calls,
    })
}
