//! Route definitions

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{self, common::CLIENT_KEY_HEADER},
    state::AppState,
};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(server.max_body_size_json_bytes));

    let router = Router::new()
        // Health
        .route("/health", get(handlers::health::health_check))
        // Scenarios (v1)
        .route("/v1/simulate", post(handlers::simulate::simulate_json))
        .route("/v1/simulate/stats", get(handlers::simulate::injection_stats))
        .route(
            "/v1/simulate/{kind}",
            get(handlers::simulate::simulate_query).post(handlers::simulate::simulate_query),
        )
        // Circuit breakers (v1)
        .route(
            "/v1/circuits/{key}",
            get(handlers::circuits::get_circuit).put(handlers::circuits::configure_circuit),
        )
        // Stress jobs (v1)
        .route(
            "/v1/stress/{job_id}",
            get(handlers::stress::get_stress_job).delete(handlers::stress::cancel_stress_job),
        );

    let router = if server.cors_enabled {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([CONTENT_TYPE, HeaderName::from_static(CLIENT_KEY_HEADER)]),
        )
    } else {
        router
    };

    router.layer(middleware).with_state(state)
}
