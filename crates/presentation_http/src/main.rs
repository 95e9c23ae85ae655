//! simbin HTTP Server
//!
//! Main entry point for the HTTP API server.

use std::{sync::Arc, time::Duration};

use infrastructure::{AppConfig, build_simulation_service, init_logging};
use presentation_http::{AppState, CleanupSchedule, routes, spawn_registry_cleanup_task};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_logging(&config.logging)?;
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    info!(version = env!("CARGO_PKG_VERSION"), "simbin starting");
    info!(
        host = %config.server.host,
        port = %config.server.port,
        seed = ?config.simulation.seed,
        "Configuration loaded"
    );

    let simulation = build_simulation_service(&config.simulation)
        .map_err(|e| anyhow::anyhow!("Invalid simulation configuration: {e}"))?;

    let cleanup_handle = spawn_registry_cleanup_task(
        Arc::clone(&simulation),
        CleanupSchedule::from(&config.simulation),
    );

    let addr = config.server.bind_addr();
    let shutdown_timeout = config.server.shutdown_timeout();
    let app = routes::create_router(AppState::new(simulation, config));

    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    cleanup_handle.abort();
    info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM) and handle graceful shutdown
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        // SIGTERM still shuts down if this fails
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    info!(timeout = ?timeout, "Waiting for connections to close");
}
