//! simbin HTTP presentation layer
//!
//! This crate exposes the simulation engine over HTTP.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod tasks;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use tasks::{CleanupSchedule, spawn_registry_cleanup_task};
