//! Background tasks for the HTTP presentation layer

mod registry_cleanup;

pub use registry_cleanup::{CleanupSchedule, spawn_registry_cleanup_task};
