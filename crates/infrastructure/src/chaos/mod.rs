//! Chaos adapters: latency and failure injection, cascading failures

mod cascade;
mod fault_injector;
mod injection_stats;

use std::time::Duration;

pub use cascade::CascadeSimulator;
pub use fault_injector::{FaultInjector, plan};
pub use injection_stats::InjectionStats;

/// Whole milliseconds in `d`, saturating
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn millis(d: Duration) -> u64 {
    d.as_millis().min(u128::from(u64::MAX)) as u64
}
