//! Application services - Use case implementations

mod scenario_plan;
mod simulation_service;

pub use scenario_plan::{
    BreakerOverrides, CascadePlan, CircuitAction, CircuitPlan, DEFAULT_CASCADE_DEPTH,
    DEFAULT_CASCADE_ERROR_STATUS, DEFAULT_CASCADE_FANOUT, DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW,
    DEFAULT_STRESS_DURATION, ScenarioPlan, StressPlan, allowed_parameters,
};
pub use simulation_service::{
    DOWNSTREAM_FAILURE_STATUS, RATE_LIMITED_STATUS, SHORT_CIRCUIT_STATUS, STRESS_ACCEPTED_STATUS,
    SimulationService, SweepReport,
};
