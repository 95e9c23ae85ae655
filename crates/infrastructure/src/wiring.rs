//! Assembles the simulation engine from configuration

use std::sync::Arc;

use application::{
    SimulationService,
    ports::{ClockPort, RandomPort},
};
use domain::ConfigurationError;
use tracing::info;

use crate::{
    adapters::{CircuitBreakerRegistry, FixedWindowRateLimiter, SystemClock, random_source},
    chaos::{CascadeSimulator, FaultInjector},
    config::SimulationConfig,
    stress::StressHarness,
};

/// Build a simulation service backed by the system clock
pub fn build_simulation_service(
    config: &SimulationConfig,
) -> Result<Arc<SimulationService>, ConfigurationError> {
    build_simulation_service_with(config, Arc::new(SystemClock), random_source(config.seed))
}

/// Build a simulation service on an explicit clock and random source
pub fn build_simulation_service_with(
    config: &SimulationConfig,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
) -> Result<Arc<SimulationService>, ConfigurationError> {
    let breaker_policy = config.default_breaker_policy()?;

    let service = SimulationService::new(
        Arc::new(FixedWindowRateLimiter::new(Arc::clone(&clock))),
        Arc::new(CircuitBreakerRegistry::with_default_policy(clock, breaker_policy)),
        Arc::new(FaultInjector::new(Arc::clone(&random))),
        Arc::new(CascadeSimulator::new(Arc::clone(&random))),
        Arc::new(StressHarness::new(config.stress_budgets())),
        random,
    );

    info!(
        seeded = config.seed.is_some(),
        memory_budget_mib = config.memory_budget_mib,
        connection_pool_size = config.connection_pool_size,
        "Simulation engine ready"
    );

    Ok(Arc::new(service))
}
