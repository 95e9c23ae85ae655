//! Application layer - Use cases and orchestration
//!
//! Contains the simulation facade, scenario validation and the port
//! definitions the infrastructure engines implement.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
