//! Scenario handlers
//!
//! `/v1/simulate/{kind}` takes parameters from the query string, where
//! numeric and boolean strings are coerced. `/v1/simulate` takes a JSON
//! body with typed parameters.

use application::InjectionStatsSnapshot;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::HeaderMap,
    response::Response,
};
use domain::{Parameters, ScenarioKind, ScenarioRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::ApiError,
    handlers::common::{client_key, outcome_response},
    state::AppState,
};

/// JSON scenario body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateBody {
    /// Engine key; falls back to the client-key header
    #[serde(default)]
    pub key: Option<String>,
    /// Scenario kind
    pub kind: ScenarioKind,
    /// Scenario options
    #[serde(default)]
    pub parameters: Parameters,
}

/// Run a scenario described by the path and query string
pub async fn simulate_query(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let kind: ScenarioKind = kind.parse()?;

    let mut explicit_key = None;
    let params = Parameters::from_query(pairs.into_iter().filter_map(|(name, value)| {
        if name == "key" {
            explicit_key = Some(value);
            None
        } else {
            Some((name, value))
        }
    }));
    let key = client_key(&headers, explicit_key);

    debug!(key = %key, kind = %kind, params = params.len(), "Query scenario");
    let outcome = state
        .simulation
        .run(ScenarioRequest::new(key, kind, params))
        .await?;
    Ok(outcome_response(outcome))
}

/// Run a scenario described by a JSON body
pub async fn simulate_json(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SimulateBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let key = client_key(&headers, body.key);

    let outcome = state
        .simulation
        .run(ScenarioRequest::new(key, body.kind, body.parameters))
        .await?;
    Ok(outcome_response(outcome))
}

/// Injector statistics
pub async fn injection_stats(State(state): State<AppState>) -> Json<InjectionStatsSnapshot> {
    Json(state.simulation.injection_stats())
}
