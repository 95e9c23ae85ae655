//! Infrastructure layer - Engine adapters
//!
//! Implements the ports defined in the application layer: clocks and
//! random sources, the keyed rate-limit and circuit-breaker registries,
//! fault injection, cascade simulation and the stress harness. Also holds
//! configuration loading and logging setup.

pub mod adapters;
pub mod chaos;
pub mod config;
pub mod stress;
pub mod telemetry;
pub mod wiring;

pub use adapters::*;
pub use chaos::{CascadeSimulator, FaultInjector, InjectionStats};
pub use config::{AppConfig, LogFormat, LoggingConfig, ServerConfig, SimulationConfig};
pub use stress::{StressBudgets, StressHarness};
pub use telemetry::{TelemetryError, init_logging};
pub use wiring::{build_simulation_service, build_simulation_service_with};
