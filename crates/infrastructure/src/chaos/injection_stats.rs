//! Counters over executed fault injections

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use application::ports::InjectionStatsSnapshot;

use super::millis;

/// Lock-free injection counters shared by every caller
#[derive(Debug, Default)]
pub struct InjectionStats {
    total_calls: AtomicU64,
    failures_injected: AtomicU64,
    total_latency_ms: AtomicU64,
}

impl InjectionStats {
    /// Create zeroed counters
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total_calls: AtomicU64::new(0),
            failures_injected: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
        }
    }

    /// Record one executed injection
    pub fn record(&self, latency: Duration, failed: bool) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(millis(latency), Ordering::Relaxed);
        if failed {
            self.failures_injected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Current values
    pub fn snapshot(&self) -> InjectionStatsSnapshot {
        InjectionStatsSnapshot {
            total_calls: self.total_calls.load(Ordering::Relaxed),
            failures_injected: self.failures_injected.load(Ordering::Relaxed),
            total_latency_ms: self.total_latency_ms.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.total_calls.store(0, Ordering::Relaxed);
        self.failures_injected.store(0, Ordering::Relaxed);
        self.total_latency_ms.store(0, Ordering::Relaxed);
    }
}
