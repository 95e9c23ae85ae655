//! Clock adapters

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use application::ports::ClockPort;
use parking_lot::Mutex;

/// Monotonic clock backed by the tokio timer
///
/// Reading through tokio keeps tests that pause or advance tokio time
/// consistent with the engines' view of time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Create a clock frozen at the current instant
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl ClockPort for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}
