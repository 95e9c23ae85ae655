//! Registry and stress-job sweep task
//!
//! Periodically evicts idle rate-limit and breaker keys and forgets
//! finished stress jobs past their retention.

use std::{sync::Arc, time::Duration};

use application::SimulationService;
use infrastructure::SimulationConfig;
use tracing::{debug, info};

/// When and what the sweep removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupSchedule {
    /// Time between sweeps
    pub interval: Duration,
    /// Keys idle this long are evicted
    pub idle_ttl: Duration,
    /// Finished jobs older than this are forgotten
    pub job_retention: Duration,
}

impl From<&SimulationConfig> for CleanupSchedule {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            interval: config.cleanup_interval(),
            idle_ttl: config.registry_idle_ttl(),
            job_retention: config.job_retention(),
        }
    }
}

/// Spawn a background task that periodically sweeps engine state.
///
/// Returns a `JoinHandle` that can be used to abort the task when shutting down.
pub fn spawn_registry_cleanup_task(
    simulation: Arc<SimulationService>,
    schedule: CleanupSchedule,
) -> tokio::task::JoinHandle<()> {
    info!(
        interval_secs = schedule.interval.as_secs(),
        idle_ttl_secs = schedule.idle_ttl.as_secs(),
        job_retention_secs = schedule.job_retention.as_secs(),
        "Starting registry cleanup task"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(schedule.interval);
        // Don't run immediately on startup
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let report = simulation.sweep(schedule.idle_ttl, schedule.job_retention);
            if report.total() > 0 {
                info!(
                    rate_limit_keys = report.rate_limit_keys,
                    breaker_keys = report.breaker_keys,
                    stress_jobs = report.stress_jobs,
                    "Swept idle simulation state"
                );
            } else {
                debug!("Nothing to sweep");
            }
        }
    })
}
