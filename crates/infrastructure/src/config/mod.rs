//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `simulation`: engine budgets, registry lifecycle, default policies
//! - `logging`: log format and filter
//!
//! Values are layered: built-in defaults, then an optional `config.toml`,
//! then `SIMBIN_*` environment variables. Nested keys are separated by a
//! double underscore, e.g. `SIMBIN_SIMULATION__REGISTRY_IDLE_TTL_SECS=120`.

mod logging;
mod server;
mod simulation;

use serde::{Deserialize, Serialize};

pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;
pub use simulation::SimulationConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SIMBIN";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Simulation engine configuration
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration using `file` (without extension) as the optional file source
    pub fn load_from(file: &str) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Load from file if exists
            .add_source(config::File::with_name(file).required(false))
            // Override with environment variables (e.g., SIMBIN_SERVER__PORT)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
