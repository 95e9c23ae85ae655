//! Latency and failure injection port

use std::time::Duration;

use async_trait::async_trait;
use domain::{DelayPolicy, Outcome};
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

/// Decided but not yet executed injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionPlan {
    /// Delay to apply before answering
    pub delay: Duration,
    /// Whether a failure is injected
    pub failed: bool,
    /// Status the caller should see
    pub status: u16,
}

/// Counters over every injection executed so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InjectionStatsSnapshot {
    /// Injections executed
    pub total_calls: u64,
    /// Injections that reported a failure
    pub failures_injected: u64,
    /// Sum of all applied delays in milliseconds
    pub total_latency_ms: u64,
}

impl InjectionStatsSnapshot {
    /// Fraction of calls that failed
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn failure_ratio(&self) -> f64 {
        if self.total_calls == 0 {
            return 0.0;
        }
        self.failures_injected as f64 / self.total_calls as f64
    }
}

/// Applies delay and failure policies to simulated calls
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FaultInjectorPort: Send + Sync + std::fmt::Debug {
    /// Draw the delay, failure and status for one call without executing it
    fn plan(&self, policy: &DelayPolicy) -> InjectionPlan;

    /// Plan and execute one call
    ///
    /// The delay is a non-blocking sleep; dropping the returned future
    /// cancels it.
    async fn inject(&self, policy: &DelayPolicy) -> Outcome;

    /// Current counters
    fn stats(&self) -> InjectionStatsSnapshot;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_ratio_handles_zero_calls() {
        assert!(InjectionStatsSnapshot::default().failure_ratio().abs() < f64::EPSILON);
    }

    #[test]
    fn failure_ratio() {
        let stats = InjectionStatsSnapshot {
            total_calls: 4,
            failures_injected: 1,
            total_latency_ms: 0,
        };
        assert!((stats.failure_ratio() - 0.25).abs() < f64::EPSILON);
    }
}
