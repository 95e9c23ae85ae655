//! Circuit breaker port

use std::time::Duration;

use domain::{BreakerPhase, BreakerPolicy};
#[cfg(test)]
use mockall::automock;
use serde::Serialize;

/// Why a breaker rejected a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Circuit is open and the recovery timeout has not elapsed
    Open,
    /// All half-open trial calls are already in flight
    HalfOpenBudgetExhausted,
}

impl RejectReason {
    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::HalfOpenBudgetExhausted => "half_open_budget_exhausted",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of asking a breaker whether a call may proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerDecision {
    /// Whether the call may proceed
    pub admitted: bool,
    /// Phase after evaluating the check
    pub phase: BreakerPhase,
    /// Set when rejected
    pub reason: Option<RejectReason>,
    /// Time until the breaker probes again, set when rejected while open
    pub retry_after: Option<Duration>,
}

impl BreakerDecision {
    /// An admitted call
    #[must_use]
    pub const fn admit(phase: BreakerPhase) -> Self {
        Self {
            admitted: true,
            phase,
            reason: None,
            retry_after: None,
        }
    }

    /// A rejected call
    #[must_use]
    pub const fn reject(
        phase: BreakerPhase,
        reason: RejectReason,
        retry_after: Option<Duration>,
    ) -> Self {
        Self {
            admitted: false,
            phase,
            reason: Some(reason),
            retry_after,
        }
    }
}

/// Externally visible breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSnapshot {
    /// Current phase
    pub phase: BreakerPhase,
    /// Consecutive failures while closed
    pub consecutive_failures: u32,
    /// Trial calls admitted in the current half-open period
    pub trials_admitted: u32,
    /// Trial calls that succeeded in the current half-open period
    pub trials_succeeded: u32,
    /// Time since the breaker last opened, if open
    pub open_for: Option<Duration>,
    /// Policy in force
    pub policy: BreakerPolicy,
}

/// Per-key circuit breakers
#[cfg_attr(test, automock)]
pub trait CircuitBreakerPort: Send + Sync + std::fmt::Debug {
    /// Ask whether a call for `key` may proceed
    ///
    /// An open breaker whose recovery timeout elapsed moves to half-open
    /// before the check is evaluated.
    fn check(&self, key: &str) -> BreakerDecision;

    /// Record the result of an admitted call, returning the resulting phase
    fn record(&self, key: &str, succeeded: bool) -> BreakerPhase;

    /// Replace the policy for `key`, optionally forcing a phase
    ///
    /// Forcing a phase resets all counters.
    fn configure(
        &self,
        key: &str,
        policy: BreakerPolicy,
        force: Option<BreakerPhase>,
    ) -> BreakerSnapshot;

    /// Policy given to breakers created without an explicit one
    fn default_policy(&self) -> BreakerPolicy;

    /// Current state for `key`, `None` if never referenced
    fn snapshot(&self, key: &str) -> Option<BreakerSnapshot>;

    /// Drop keys not touched for `idle`, returning how many were removed
    fn evict_idle(&self, idle: Duration) -> usize;
}
