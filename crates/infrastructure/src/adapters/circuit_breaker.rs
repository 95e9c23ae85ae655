//! Circuit breakers keyed by simulated service
//!
//! Each key gets its own breaker, created with the registry's default
//! policy the first time it is referenced.
//!
//! # States
//!
//! - **Closed**: Normal operation, calls pass through and consecutive
//!   failures are counted
//! - **Open**: Calls are rejected until the recovery timeout elapses;
//!   results recorded meanwhile are ignored
//! - **Half-Open**: A limited number of trial calls is admitted; enough
//!   successes close the circuit, any failure reopens it. Trials whose
//!   result is not recorded within the recovery timeout are released
//!
//! The open to half-open move happens lazily, on the first check after
//! the recovery timeout.

use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use application::ports::{
    BreakerDecision, BreakerSnapshot, CircuitBreakerPort, ClockPort, RejectReason,
};
use domain::{BreakerPhase, BreakerPolicy};
use tracing::{debug, info, warn};

use super::registry::KeyedRegistry;

/// Internal state tracking for one key
#[derive(Debug, Clone)]
struct CircuitState {
    phase: BreakerPhase,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    policy: BreakerPolicy,
    trials_admitted: u32,
    trials_succeeded: u32,
    last_trial_at: Option<Instant>,
}

impl CircuitState {
    const fn new(policy: BreakerPolicy) -> Self {
        Self {
            phase: BreakerPhase::Closed,
            consecutive_failures: 0,
            opened_at: None,
            policy,
            trials_admitted: 0,
            trials_succeeded: 0,
            last_trial_at: None,
        }
    }

    fn reset_counters(&mut self) {
        self.consecutive_failures = 0;
        self.trials_admitted = 0;
        self.trials_succeeded = 0;
        self.last_trial_at = None;
    }

    fn open(&mut self, now: Instant) {
        self.phase = BreakerPhase::Open;
        self.opened_at = Some(now);
        self.reset_counters();
    }

    fn half_open(&mut self) {
        self.phase = BreakerPhase::HalfOpen;
        self.opened_at = None;
        self.reset_counters();
    }

    fn close(&mut self) {
        self.phase = BreakerPhase::Closed;
        self.opened_at = None;
        self.reset_counters();
    }

    fn open_for(&self, now: Instant) -> Option<Duration> {
        self.opened_at
            .map(|opened_at| now.saturating_duration_since(opened_at))
    }

    fn check(&mut self, key: &str, now: Instant) -> BreakerDecision {
        match self.phase {
            BreakerPhase::Closed => BreakerDecision::admit(BreakerPhase::Closed),
            BreakerPhase::Open => {
                let elapsed = self.open_for(now).unwrap_or(Duration::ZERO);
                let recovery = self.policy.recovery_timeout();
                if elapsed < recovery {
                    return BreakerDecision::reject(
                        BreakerPhase::Open,
                        RejectReason::Open,
                        Some(recovery - elapsed),
                    );
                }
                debug!(
                    key = %key,
                    elapsed_ms = elapsed.as_millis(),
                    "Circuit transitioning from Open to HalfOpen"
                );
                self.half_open();
                self.admit_trial(key, now)
            },
            BreakerPhase::HalfOpen => self.admit_trial(key, now),
        }
    }

    fn admit_trial(&mut self, key: &str, now: Instant) -> BreakerDecision {
        let recovery = self.policy.recovery_timeout();
        if self.trials_admitted >= self.policy.half_open_trial_budget() {
            let since_last = self
                .last_trial_at
                .map_or(recovery, |at| now.saturating_duration_since(at));
            if since_last < recovery {
                return BreakerDecision::reject(
                    BreakerPhase::HalfOpen,
                    RejectReason::HalfOpenBudgetExhausted,
                    Some(recovery - since_last),
                );
            }
            // Trials without a recorded result expire after one recovery timeout.
            debug!(
                key = %key,
                abandoned = self.trials_admitted - self.trials_succeeded,
                "Releasing unrecorded half-open trials"
            );
            self.trials_admitted = self.trials_succeeded;
        }
        self.trials_admitted += 1;
        self.last_trial_at = Some(now);
        BreakerDecision::admit(BreakerPhase::HalfOpen)
    }

    /// Records a successful call
    fn on_success(&mut self, key: &str) {
        match self.phase {
            BreakerPhase::Closed => self.consecutive_failures = 0,
            BreakerPhase::HalfOpen => {
                self.trials_succeeded += 1;
                if self.trials_succeeded >= self.policy.half_open_trial_budget() {
                    info!(
                        key = %key,
                        successes = self.trials_succeeded,
                        "Circuit transitioning from HalfOpen to Closed"
                    );
                    self.close();
                }
            },
            BreakerPhase::Open => {
                debug!(key = %key, "Ignoring success recorded while open");
            },
        }
    }

    /// Records a failed call
    fn on_failure(&mut self, key: &str, now: Instant) {
        match self.phase {
            BreakerPhase::Closed => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= self.policy.failure_threshold() {
                    warn!(
                        key = %key,
                        failures = self.consecutive_failures,
                        "Circuit transitioning from Closed to Open"
                    );
                    self.open(now);
                }
            },
            BreakerPhase::HalfOpen => {
                warn!(
                    key = %key,
                    "Circuit transitioning from HalfOpen to Open after failure"
                );
                self.open(now);
            },
            BreakerPhase::Open => {
                debug!(key = %key, "Ignoring failure recorded while open");
            },
        }
    }

    fn snapshot(&self, now: Instant) -> BreakerSnapshot {
        BreakerSnapshot {
            phase: self.phase,
            consecutive_failures: self.consecutive_failures,
            trials_admitted: self.trials_admitted,
            trials_succeeded: self.trials_succeeded,
            open_for: self.open_for(now),
            policy: self.policy,
        }
    }
}

/// Registry of per-key circuit breakers
pub struct CircuitBreakerRegistry {
    circuits: KeyedRegistry<CircuitState>,
    default_policy: BreakerPolicy,
    clock: Arc<dyn ClockPort>,
}

impl fmt::Debug for CircuitBreakerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreakerRegistry")
            .field("circuits", &self.circuits.len())
            .field("default_policy", &self.default_policy)
            .finish_non_exhaustive()
    }
}

impl CircuitBreakerRegistry {
    /// Creates a registry whose new breakers use the default policy
    #[must_use]
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self::with_default_policy(clock, BreakerPolicy::default())
    }

    /// Creates a registry whose new breakers use `policy`
    #[must_use]
    pub fn with_default_policy(clock: Arc<dyn ClockPort>, policy: BreakerPolicy) -> Self {
        Self {
            circuits: KeyedRegistry::new(),
            default_policy: policy,
            clock,
        }
    }

    fn with_state<R>(&self, key: &str, f: impl FnOnce(&mut CircuitState, Instant) -> R) -> R {
        let now = self.clock.now();
        let policy = self.default_policy;
        self.circuits
            .with(key, now, || CircuitState::new(policy), |state| f(state, now))
    }
}

impl CircuitBreakerPort for CircuitBreakerRegistry {
    fn check(&self, key: &str) -> BreakerDecision {
        let decision = self.with_state(key, |state, now| state.check(key, now));
        if !decision.admitted {
            debug!(
                key = %key,
                phase = %decision.phase,
                reason = ?decision.reason,
                "Circuit breaker preventing call"
            );
        }
        decision
    }

    fn record(&self, key: &str, succeeded: bool) -> BreakerPhase {
        self.with_state(key, |state, now| {
            if succeeded {
                state.on_success(key);
            } else {
                state.on_failure(key, now);
            }
            state.phase
        })
    }

    fn configure(
        &self,
        key: &str,
        policy: BreakerPolicy,
        force: Option<BreakerPhase>,
    ) -> BreakerSnapshot {
        self.with_state(key, |state, now| {
            state.policy = policy;
            if let Some(phase) = force {
                info!(key = %key, from = %state.phase, to = %phase, "Forcing circuit phase");
                match phase {
                    BreakerPhase::Closed => state.close(),
                    BreakerPhase::Open => state.open(now),
                    BreakerPhase::HalfOpen => state.half_open(),
                }
            }
            state.snapshot(now)
        })
    }

    fn default_policy(&self) -> BreakerPolicy {
        self.default_policy
    }

    fn snapshot(&self, key: &str) -> Option<BreakerSnapshot> {
        let now = self.clock.now();
        self.circuits.peek(key, |state| state.snapshot(now))
    }

    fn evict_idle(&self, idle: Duration) -> usize {
        self.circuits.evict_idle(self.clock.now(), idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ManualClock;

    fn registry(threshold: u32, recovery_ms: u64, budget: u32) -> (CircuitBreakerRegistry, ManualClock) {
        let clock = ManualClock::new();
        let policy =
            BreakerPolicy::new(threshold, Duration::from_millis(recovery_ms), budget).unwrap();
        (
            CircuitBreakerRegistry::with_default_policy(Arc::new(clock.clone()), policy),
            clock,
        )
    }

    fn trip(breakers: &CircuitBreakerRegistry, key: &str, failures: u32) {
        for _ in 0..failures {
            assert!(breakers.check(key).admitted);
            breakers.record(key, false);
        }
    }

    #[test]
    fn initial_state_is_closed() {
        let (breakers, _clock) = registry(3, 1000, 1);
        let decision = breakers.check("svc");
        assert!(decision.admitted);
        assert_eq!(decision.phase, BreakerPhase::Closed);
    }

    #[test]
    fn unknown_key_has_no_snapshot() {
        let (breakers, _clock) = registry(3, 1000, 1);
        assert!(breakers.snapshot("never").is_none());
    }

    #[test]
    fn opens_after_threshold_failures() {
        let (breakers, _clock) = registry(3, 1000, 1);
        trip(&breakers, "svc", 2);
        assert_eq!(breakers.snapshot("svc").unwrap().consecutive_failures, 2);

        trip(&breakers, "svc", 1);
        let decision = breakers.check("svc");
        assert!(!decision.admitted);
        assert_eq!(decision.phase, BreakerPhase::Open);
        assert_eq!(decision.reason, Some(RejectReason::Open));
        assert_eq!(decision.retry_after, Some(Duration::from_millis(1000)));
    }

    #[test]
    fn success_resets_failure_count() {
        let (breakers, _clock) = registry(3, 1000, 1);
        trip(&breakers, "svc", 2);
        breakers.record("svc", true);
        trip(&breakers, "svc", 2);
        assert_eq!(breakers.snapshot("svc").unwrap().phase, BreakerPhase::Closed);
    }

    #[test]
    fn rejects_until_recovery_timeout() {
        let (breakers, clock) = registry(1, 1000, 1);
        trip(&breakers, "svc", 1);

        clock.advance(Duration::from_millis(999));
        let decision = breakers.check("svc");
        assert!(!decision.admitted);
        assert_eq!(decision.retry_after, Some(Duration::from_millis(1)));

        clock.advance(Duration::from_millis(1));
        let decision = breakers.check("svc");
        assert!(decision.admitted);
        assert_eq!(decision.phase, BreakerPhase::HalfOpen);
    }

    #[test]
    fn half_open_success_closes_with_budget_one() {
        let (breakers, clock) = registry(1, 100, 1);
        trip(&breakers, "svc", 1);
        clock.advance(Duration::from_millis(100));

        assert!(breakers.check("svc").admitted);
        assert_eq!(breakers.record("svc", true), BreakerPhase::Closed);
        assert!(breakers.check("svc").admitted);
    }

    #[test]
    fn half_open_failure_reopens() {
        let (breakers, clock) = registry(1, 100, 1);
        trip(&breakers, "svc", 1);
        clock.advance(Duration::from_millis(100));

        assert!(breakers.check("svc").admitted);
        assert_eq!(breakers.record("svc", false), BreakerPhase::Open);

        let decision = breakers.check("svc");
        assert!(!decision.admitted);
        assert_eq!(decision.retry_after, Some(Duration::from_millis(100)));
    }

    #[test]
    fn half_open_budget_limits_trials() {
        let (breakers, clock) = registry(1, 100, 2);
        trip(&breakers, "svc", 1);
        clock.advance(Duration::from_millis(100));

        assert!(breakers.check("svc").admitted);
        assert!(breakers.check("svc").admitted);
        let third = breakers.check("svc");
        assert!(!third.admitted);
        assert_eq!(third.reason, Some(RejectReason::HalfOpenBudgetExhausted));

        assert_eq!(breakers.record("svc", true), BreakerPhase::HalfOpen);
        assert_eq!(breakers.record("svc", true), BreakerPhase::Closed);
    }

    #[test]
    fn unrecorded_trials_are_released_after_recovery_timeout() {
        let (breakers, clock) = registry(1, 100, 1);
        trip(&breakers, "svc", 1);
        clock.advance(Duration::from_millis(200));

        // Check-only trial that never reports back
        assert!(breakers.check("svc").admitted);
        clock.advance(Duration::from_millis(40));
        let blocked = breakers.check("svc");
        assert!(!blocked.admitted);
        assert_eq!(blocked.reason, Some(RejectReason::HalfOpenBudgetExhausted));
        assert_eq!(blocked.retry_after, Some(Duration::from_millis(60)));

        clock.advance(Duration::from_secs(3600));
        let decision = breakers.check("svc");
        assert!(decision.admitted);
        assert_eq!(decision.phase, BreakerPhase::HalfOpen);
        assert_eq!(breakers.record("svc", true), BreakerPhase::Closed);
    }

    #[test]
    fn released_trials_keep_recorded_successes() {
        let (breakers, clock) = registry(1, 100, 2);
        trip(&breakers, "svc", 1);
        clock.advance(Duration::from_millis(100));

        assert!(breakers.check("svc").admitted);
        assert_eq!(breakers.record("svc", true), BreakerPhase::HalfOpen);
        assert!(breakers.check("svc").admitted);
        assert!(!breakers.check("svc").admitted);

        clock.advance(Duration::from_millis(100));
        assert!(breakers.check("svc").admitted);
        assert_eq!(breakers.record("svc", true), BreakerPhase::Closed);
    }

    #[test]
    fn records_while_open_are_ignored() {
        let (breakers, _clock) = registry(1, 1000, 1);
        trip(&breakers, "svc", 1);
        assert_eq!(breakers.record("svc", true), BreakerPhase::Open);
        assert_eq!(breakers.record("svc", false), BreakerPhase::Open);
    }

    #[test]
    fn configure_forces_phase_and_resets_counters() {
        let (breakers, clock) = registry(5, 1000, 1);
        trip(&breakers, "svc", 3);

        let snapshot = breakers.configure("svc", BreakerPolicy::default(), Some(BreakerPhase::Open));
        assert_eq!(snapshot.phase, BreakerPhase::Open);
        assert_eq!(snapshot.consecutive_failures, 0);
        assert_eq!(snapshot.open_for, Some(Duration::ZERO));

        clock.advance(Duration::from_secs(1));
        assert!(!breakers.check("svc").admitted);

        let snapshot = breakers.configure("svc", BreakerPolicy::default(), Some(BreakerPhase::Closed));
        assert_eq!(snapshot.phase, BreakerPhase::Closed);
        assert!(breakers.check("svc").admitted);
    }

    #[test]
    fn configure_without_force_keeps_phase() {
        let (breakers, _clock) = registry(1, 1000, 1);
        trip(&breakers, "svc", 1);
        let policy = BreakerPolicy::new(10, Duration::from_secs(5), 3).unwrap();

        let snapshot = breakers.configure("svc", policy, None);
        assert_eq!(snapshot.phase, BreakerPhase::Open);
        assert_eq!(snapshot.policy, policy);
    }

    #[test]
    fn keys_are_isolated() {
        let (breakers, _clock) = registry(1, 1000, 1);
        trip(&breakers, "a", 1);
        assert!(!breakers.check("a").admitted);
        assert!(breakers.check("b").admitted);
    }

    #[test]
    fn idle_breakers_are_evicted() {
        let (breakers, clock) = registry(1, 1000, 1);
        breakers.check("svc");
        clock.advance(Duration::from_secs(10));
        assert_eq!(breakers.evict_idle(Duration::from_secs(5)), 1);
        assert!(breakers.snapshot("svc").is_none());
    }

    #[test]
    fn registry_debug() {
        let (breakers, _clock) = registry(1, 1000, 1);
        let debug = format!("{breakers:?}");
        assert!(debug.contains("CircuitBreakerRegistry"));
    }
}
