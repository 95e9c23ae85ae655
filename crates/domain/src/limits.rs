//! Hard bounds for every caller-supplied simulation parameter
//!
//! These caps are enforced by the domain constructors regardless of what a
//! caller asks for, so no scenario can run unbounded.

use std::time::Duration;

/// Longest injected delay
pub const MAX_DELAY: Duration = Duration::from_secs(30);

/// Highest request count per rate-limit window
pub const MAX_RATE_LIMIT: u32 = 10_000;

/// Shortest rate-limit window
pub const MIN_RATE_LIMIT_WINDOW: Duration = Duration::from_millis(1);

/// Longest rate-limit window
pub const MAX_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(3600);

/// Highest consecutive-failure threshold for a circuit breaker
pub const MAX_FAILURE_THRESHOLD: u32 = 1000;

/// Shortest open-to-half-open recovery timeout
pub const MIN_RECOVERY_TIMEOUT: Duration = Duration::from_millis(1);

/// Longest open-to-half-open recovery timeout
pub const MAX_RECOVERY_TIMEOUT: Duration = Duration::from_secs(3600);

/// Largest number of trial calls admitted while half-open
pub const MAX_HALF_OPEN_TRIALS: u32 = 100;

/// Deepest cascade tree
pub const MAX_CASCADE_DEPTH: u32 = 10;

/// Widest cascade fan-out per node
pub const MAX_CASCADE_FANOUT: u32 = 20;

/// Upper bound on nodes a single cascade may evaluate
pub const MAX_CASCADE_NODES: u64 = 100_000;

/// Longest stress job
pub const MAX_STRESS_DURATION: Duration = Duration::from_secs(10);

/// Shortest stress job
pub const MIN_STRESS_DURATION: Duration = Duration::from_millis(1);

/// Highest CPU duty cycle in percent
pub const MAX_CPU_INTENSITY: u32 = 100;

/// Largest memory a single stress job may hold, in MiB
pub const MAX_MEMORY_MB: u32 = 100;

/// Most simulated connections a single stress job may hold
pub const MAX_CONNECTIONS: u32 = 50;

/// Lowest valid HTTP status code
pub const MIN_STATUS: u16 = 100;

/// Highest valid HTTP status code
pub const MAX_STATUS: u16 = 599;
