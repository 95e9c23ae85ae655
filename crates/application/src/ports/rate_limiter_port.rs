//! Rate limiter port

use std::time::Duration;

use domain::RateLimitPolicy;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

/// Result of a single rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateDecision {
    /// Whether the call fits in the current window
    pub admitted: bool,
    /// Calls counted in the current window, this one included
    pub count: u32,
    /// Calls allowed per window
    pub limit: u32,
    /// Calls still allowed in this window
    pub remaining: u32,
    /// Time until the window resets, set when rejected
    #[serde(skip)]
    pub retry_after: Option<Duration>,
}

/// Per-key fixed-window rate limiting
///
/// Never waits; a check either admits or rejects immediately.
#[cfg_attr(test, automock)]
pub trait RateLimiterPort: Send + Sync + std::fmt::Debug {
    /// Count one call for `key` under `policy`
    ///
    /// A policy that differs from the one stored for `key` replaces it
    /// and restarts the window.
    fn check(&self, key: &str, policy: &RateLimitPolicy) -> RateDecision;

    /// Drop keys not touched for `idle`, returning how many were removed
    fn evict_idle(&self, idle: Duration) -> usize;

    /// Number of keys currently tracked
    fn tracked_keys(&self) -> usize;
}
