//! Stress job inspection and cancellation

use axum::{
    Json,
    extract::{Path, State},
};
use domain::StressJobStatus;

use crate::{error::ApiError, state::AppState};

/// Status of a stress job
pub async fn get_stress_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<StressJobStatus>, ApiError> {
    Ok(Json(state.simulation.stress_status(&job_id)?))
}

/// Cancel a stress job
///
/// Cancelling an already finished job returns its final status.
pub async fn cancel_stress_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<StressJobStatus>, ApiError> {
    Ok(Json(state.simulation.cancel_stress(&job_id)?))
}
