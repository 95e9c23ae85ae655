//! Application state shared across handlers

use std::sync::Arc;

use application::SimulationService;
use infrastructure::AppConfig;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Simulation engine facade
    pub simulation: Arc<SimulationService>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new application state
    pub fn new(simulation: Arc<SimulationService>, config: AppConfig) -> Self {
        Self {
            simulation,
            config: Arc::new(config),
        }
    }
}
