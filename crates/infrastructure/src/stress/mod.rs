//! Stress harness: bounded, cancellable resource consumption
//!
//! Jobs run as background tokio tasks. CPU work runs on the blocking pool;
//! memory and connection jobs draw from harness-wide semaphores so
//! concurrent jobs can never exceed the configured budgets.

mod harness;
mod job;
mod workloads;

pub use harness::{StressBudgets, StressHarness, SUPERVISOR_GRACE};
pub use workloads::{CANCEL_POLL_INTERVAL, CPU_SLICE};
