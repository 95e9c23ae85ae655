//! Clock port
//!
//! Every time-dependent decision (windows, recovery timeouts, job
//! deadlines) reads the time through this port so tests can drive it.

use std::time::Instant;

#[cfg(test)]
use mockall::automock;

/// Monotonic time source
#[cfg_attr(test, automock)]
pub trait ClockPort: Send + Sync + std::fmt::Debug {
    /// Current monotonic instant
    fn now(&self) -> Instant;
}
