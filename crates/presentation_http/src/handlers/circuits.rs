//! Circuit breaker inspection and configuration

use std::time::Duration;

use application::{BreakerOverrides, BreakerSnapshot};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use domain::BreakerPhase;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AppState};

/// Breaker state as exposed over HTTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitResponse {
    pub key: String,
    pub phase: BreakerPhase,
    pub consecutive_failures: u32,
    pub trials_admitted: u32,
    pub trials_succeeded: u32,
    /// Time spent open so far, only while open
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub open_for_ms: Option<u64>,
    pub failure_threshold: u32,
    pub recovery_timeout_ms: u64,
    pub half_open_budget: u32,
}

impl CircuitResponse {
    #[allow(clippy::cast_possible_truncation)]
    fn from_snapshot(key: String, snapshot: &BreakerSnapshot) -> Self {
        Self {
            key,
            phase: snapshot.phase,
            consecutive_failures: snapshot.consecutive_failures,
            trials_admitted: snapshot.trials_admitted,
            trials_succeeded: snapshot.trials_succeeded,
            open_for_ms: snapshot.open_for.map(|d| d.as_millis() as u64),
            failure_threshold: snapshot.policy.failure_threshold(),
            recovery_timeout_ms: snapshot.policy.recovery_timeout().as_millis() as u64,
            half_open_budget: snapshot.policy.half_open_trial_budget(),
        }
    }
}

/// Policy changes and an optional forced phase
///
/// Missing policy fields keep the value in force for the key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigureCircuitRequest {
    #[serde(default)]
    pub failure_threshold: Option<u32>,
    #[serde(default)]
    pub recovery_timeout_ms: Option<u64>,
    #[serde(default)]
    pub half_open_budget: Option<u32>,
    /// Force the breaker into this phase, resetting its counters
    #[serde(default)]
    pub phase: Option<BreakerPhase>,
}

impl ConfigureCircuitRequest {
    const fn overrides(&self) -> BreakerOverrides {
        BreakerOverrides {
            failure_threshold: self.failure_threshold,
            recovery_timeout: match self.recovery_timeout_ms {
                Some(ms) => Some(Duration::from_millis(ms)),
                None => None,
            },
            half_open_budget: self.half_open_budget,
        }
    }
}

/// Current breaker state for a key
pub async fn get_circuit(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<CircuitResponse>, ApiError> {
    let snapshot = state
        .simulation
        .breaker_snapshot(&key)
        .ok_or_else(|| ApiError::NotFound(format!("circuit {key}")))?;
    Ok(Json(CircuitResponse::from_snapshot(key, &snapshot)))
}

/// Replace a breaker's policy and optionally force its phase
pub async fn configure_circuit(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<Json<ConfigureCircuitRequest>, JsonRejection>,
) -> Result<Json<CircuitResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let policy = request
        .overrides()
        .apply(&state.simulation.breaker_policy(&key))?;
    let snapshot = state
        .simulation
        .configure_breaker(&key, policy, request.phase);

    Ok(Json(CircuitResponse::from_snapshot(key, &snapshot)))
}
