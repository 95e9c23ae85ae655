//! Fixed-window rate limiter
//!
//! Each key counts calls inside a window that starts with the first call
//! after the previous window elapsed. Calls beyond the limit are rejected
//! immediately with the time left until the window resets.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use application::ports::{ClockPort, RateDecision, RateLimiterPort};
use domain::RateLimitPolicy;
use tracing::debug;

use super::registry::KeyedRegistry;

/// Window bookkeeping for a single key
#[derive(Debug, Clone)]
struct RateLimitState {
    window_start: Instant,
    count: u32,
    policy: RateLimitPolicy,
}

impl RateLimitState {
    const fn new(policy: RateLimitPolicy, now: Instant) -> Self {
        Self {
            window_start: now,
            count: 0,
            policy,
        }
    }

    fn admit(&mut self, policy: &RateLimitPolicy, now: Instant) -> RateDecision {
        if self.policy != *policy {
            // The latest policy wins and gets a fresh window.
            *self = Self::new(*policy, now);
        } else if now.saturating_duration_since(self.window_start) >= self.policy.window() {
            self.window_start = now;
            self.count = 0;
        }

        self.count = self.count.saturating_add(1);
        let limit = self.policy.limit();

        if self.count <= limit {
            RateDecision {
                admitted: true,
                count: self.count,
                limit,
                remaining: limit - self.count,
                retry_after: None,
            }
        } else {
            let elapsed = now.saturating_duration_since(self.window_start);
            RateDecision {
                admitted: false,
                count: self.count,
                limit,
                remaining: 0,
                retry_after: Some(self.policy.window().saturating_sub(elapsed)),
            }
        }
    }
}

/// Per-key fixed-window rate limiter
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    windows: KeyedRegistry<RateLimitState>,
    clock: Arc<dyn ClockPort>,
}

impl FixedWindowRateLimiter {
    /// Create a limiter reading time from `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self {
            windows: KeyedRegistry::new(),
            clock,
        }
    }
}

impl RateLimiterPort for FixedWindowRateLimiter {
    fn check(&self, key: &str, policy: &RateLimitPolicy) -> RateDecision {
        let now = self.clock.now();
        let decision = self.windows.with(
            key,
            now,
            || RateLimitState::new(*policy, now),
            |state| state.admit(policy, now),
        );

        if !decision.admitted {
            debug!(
                key = %key,
                count = decision.count,
                limit = decision.limit,
                "Rate limit exceeded"
            );
        }
        decision
    }

    fn evict_idle(&self, idle: Duration) -> usize {
        self.windows.evict_idle(self.clock.now(), idle)
    }

    fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ManualClock;

    fn limiter() -> (FixedWindowRateLimiter, ManualClock) {
        let clock = ManualClock::new();
        (FixedWindowRateLimiter::new(Arc::new(clock.clone())), clock)
    }

    fn policy(limit: u32, window_ms: u64) -> RateLimitPolicy {
        RateLimitPolicy::new(limit, Duration::from_millis(window_ms)).unwrap()
    }

    #[test]
    fn admits_up_to_limit_then_rejects() {
        let (limiter, _clock) = limiter();
        let policy = policy(2, 1000);

        let first = limiter.check("a", &policy);
        let second = limiter.check("a", &policy);
        let third = limiter.check("a", &policy);

        assert!(first.admitted);
        assert_eq!(first.remaining, 1);
        assert!(second.admitted);
        assert_eq!(second.remaining, 0);
        assert!(!third.admitted);
        assert_eq!(third.count, 3);
        assert_eq!(third.retry_after, Some(Duration::from_millis(1000)));
    }

    #[test]
    fn retry_after_shrinks_with_elapsed_time() {
        let (limiter, clock) = limiter();
        let policy = policy(1, 1000);
        limiter.check("a", &policy);
        clock.advance(Duration::from_millis(300));

        let decision = limiter.check("a", &policy);
        assert_eq!(decision.retry_after, Some(Duration::from_millis(700)));
    }

    #[test]
    fn window_resets_after_elapsing() {
        let (limiter, clock) = limiter();
        let policy = policy(1, 1000);
        assert!(limiter.check("a", &policy).admitted);
        assert!(!limiter.check("a", &policy).admitted);

        clock.advance(Duration::from_millis(1000));
        let decision = limiter.check("a", &policy);
        assert!(decision.admitted);
        assert_eq!(decision.count, 1);
    }

    #[test]
    fn keys_do_not_share_windows() {
        let (limiter, _clock) = limiter();
        let policy = policy(1, 1000);
        assert!(limiter.check("a", &policy).admitted);
        assert!(limiter.check("b", &policy).admitted);
        assert!(!limiter.check("a", &policy).admitted);
    }

    #[test]
    fn changed_policy_restarts_window() {
        let (limiter, _clock) = limiter();
        assert!(limiter.check("a", &policy(1, 1000)).admitted);
        assert!(!limiter.check("a", &policy(1, 1000)).admitted);

        let decision = limiter.check("a", &policy(5, 1000));
        assert!(decision.admitted);
        assert_eq!(decision.count, 1);
        assert_eq!(decision.limit, 5);
    }

    #[test]
    fn idle_keys_are_evicted() {
        let (limiter, clock) = limiter();
        limiter.check("a", &policy(1, 1000));
        assert_eq!(limiter.tracked_keys(), 1);

        clock.advance(Duration::from_secs(601));
        assert_eq!(limiter.evict_idle(Duration::from_secs(600)), 1);
        assert_eq!(limiter.tracked_keys(), 0);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn admits_exactly_limit_within_one_window(limit in 1u32..50, calls in 0u32..120) {
                let (limiter, _clock) = limiter();
                let policy = policy(limit, 60_000);
                let admitted = (0..calls)
                    .filter(|_| limiter.check("k", &policy).admitted)
                    .count();
                prop_assert_eq!(admitted, calls.min(limit) as usize);
            }

            #[test]
            fn retry_after_never_exceeds_window(
                limit in 1u32..5,
                window_ms in 1u64..10_000,
                steps in prop::collection::vec(0u64..2_000, 1..40)
            ) {
                let (limiter, clock) = limiter();
                let policy = policy(limit, window_ms);
                for step in steps {
                    clock.advance(Duration::from_millis(step));
                    let decision = limiter.check("k", &policy);
                    prop_assert!(decision.count <= limit || !decision.admitted);
                    if let Some(wait) = decision.retry_after {
                        prop_assert!(wait <= policy.window());
                    }
                }
            }
        }
    }
}
