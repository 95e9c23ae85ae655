//! Domain layer for simbin
//!
//! Contains the resilience-simulation vocabulary: scenario requests,
//! validated policies, outcomes and configuration errors.
//! This layer has no runtime dependencies and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod limits;
pub mod value_objects;

pub use entities::*;
pub use errors::ConfigurationError;
pub use value_objects::*;
