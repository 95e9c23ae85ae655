//! Shared helpers for HTTP handlers

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use domain::Outcome;

/// Header naming the caller for per-key engine state
pub const CLIENT_KEY_HEADER: &str = "x-client-key";

/// Key used when the caller names none
pub const DEFAULT_CLIENT_KEY: &str = "anonymous";

/// Resolve the engine key: explicit value, then header, then the default
pub fn client_key(headers: &HeaderMap, explicit: Option<String>) -> String {
    explicit
        .filter(|k| !k.trim().is_empty())
        .or_else(|| {
            headers
                .get(CLIENT_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| DEFAULT_CLIENT_KEY.to_string())
}

/// Render an outcome with its simulated status
///
/// Rejections that carry `retry_after_ms` also get a `Retry-After`
/// header in whole seconds, rounded up.
pub fn outcome_response(outcome: Outcome) -> Response {
    let status =
        StatusCode::from_u16(outcome.simulated_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let retry_after = outcome
        .detail("retry_after_ms")
        .and_then(serde_json::Value::as_u64)
        .filter(|_| !outcome.admitted)
        .map(|ms| ms.div_ceil(1000).max(1));

    let mut response = (status, Json(outcome)).into_response();
    if let Some(secs) = retry_after {
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(secs));
    }
    response
}
