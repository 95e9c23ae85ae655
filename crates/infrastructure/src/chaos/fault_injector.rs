//! Latency and failure injector
//!
//! Planning is a pure function of the policy and the random source, so a
//! seeded source always yields the same delays and failures. Executing a
//! plan sleeps on the tokio timer and never blocks a worker thread.

use std::{sync::Arc, time::Duration};

use application::ports::{
    FaultInjectorPort, InjectionPlan, InjectionStatsSnapshot, RandomPort, choose,
};
use async_trait::async_trait;
use domain::{DelayPolicy, Outcome};
use tracing::debug;

use super::{InjectionStats, millis};

/// Draw the delay, failure and status for one call
///
/// The delay is uniform over `[min_delay, max_delay]` at millisecond
/// resolution. A single `[0, 1)` draw then decides failure; the failure
/// status comes from the error-code pool when one is configured.
pub fn plan(policy: &DelayPolicy, random: &dyn RandomPort) -> InjectionPlan {
    let delay = Duration::from_millis(
        random.range_inclusive(millis(policy.min_delay()), millis(policy.max_delay())),
    );
    let failed = policy.failure_rate().hit(random.next_f64());
    let status = if failed {
        choose(random, policy.error_codes())
            .copied()
            .unwrap_or_else(|| policy.error_status())
    } else {
        policy.success_status()
    };

    InjectionPlan {
        delay,
        failed,
        status,
    }
}

/// Fault injector for simulated calls
#[derive(Debug)]
pub struct FaultInjector {
    random: Arc<dyn RandomPort>,
    stats: InjectionStats,
}

impl FaultInjector {
    /// Create an injector drawing from `random`
    pub fn new(random: Arc<dyn RandomPort>) -> Self {
        Self {
            random,
            stats: InjectionStats::new(),
        }
    }

    /// Reset the injector statistics
    pub fn reset(&self) {
        self.stats.reset();
    }
}

#[async_trait]
impl FaultInjectorPort for FaultInjector {
    fn plan(&self, policy: &DelayPolicy) -> InjectionPlan {
        plan(policy, self.random.as_ref())
    }

    async fn inject(&self, policy: &DelayPolicy) -> Outcome {
        let plan = plan(policy, self.random.as_ref());

        if !plan.delay.is_zero() {
            tokio::time::sleep(plan.delay).await;
        }
        self.stats.record(plan.delay, plan.failed);

        debug!(
            delay_ms = millis(plan.delay),
            failed = plan.failed,
            status = plan.status,
            "Injected simulated call"
        );

        Outcome::admitted(plan.status)
            .with_latency(plan.delay)
            .with_failure(plan.failed)
    }

    fn stats(&self) -> InjectionStatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use domain::Probability;
    use mockall::mock;

    use super::*;
    use crate::adapters::SeededRandom;

    mock! {
        Draws {}

        impl RandomPort for Draws {
            fn next_f64(&self) -> f64;
            fn range_inclusive(&self, low: u64, high: u64) -> u64;
        }
    }

    impl std::fmt::Debug for MockDraws {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("MockDraws").finish_non_exhaustive()
        }
    }

    fn policy(min_ms: u64, max_ms: u64, failure_rate: f64) -> DelayPolicy {
        DelayPolicy::new(
            Duration::from_millis(min_ms),
            Duration::from_millis(max_ms),
            Probability::new("failure_rate", failure_rate).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn zero_failure_rate_never_fails() {
        let random = SeededRandom::new(1);
        let policy = policy(0, 0, 0.0);
        for _ in 0..1000 {
            let plan = plan(&policy, &random);
            assert!(!plan.failed);
            assert_eq!(plan.status, 200);
        }
    }

    #[test]
    fn full_failure_rate_always_fails() {
        let random = SeededRandom::new(2);
        let policy = policy(0, 0, 1.0);
        for _ in 0..1000 {
            let plan = plan(&policy, &random);
            assert!(plan.failed);
            assert_eq!(plan.status, 500);
        }
    }

    #[test]
    fn delay_stays_within_bounds() {
        let random = SeededRandom::new(3);
        let policy = policy(100, 250, 0.0);
        for _ in 0..1000 {
            let delay = plan(&policy, &random).delay;
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(250));
        }
    }

    #[test]
    fn seeded_plans_are_reproducible() {
        let policy = policy(0, 1000, 0.5);
        let a = SeededRandom::new(99);
        let b = SeededRandom::new(99);
        let plans_a: Vec<_> = (0..50).map(|_| plan(&policy, &a)).collect();
        let plans_b: Vec<_> = (0..50).map(|_| plan(&policy, &b)).collect();
        assert_eq!(plans_a, plans_b);
    }

    #[test]
    fn failure_status_drawn_from_pool() {
        let random = SeededRandom::new(4);
        let policy = policy(0, 0, 1.0).with_error_codes(vec![502, 503, 504]).unwrap();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(plan(&policy, &random).status);
        }
        assert!(seen.iter().all(|s| [502, 503, 504].contains(s)));
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn custom_statuses_are_used() {
        let random = SeededRandom::new(5);
        let ok = policy(0, 0, 0.0).with_success_status(204).unwrap();
        assert_eq!(plan(&ok, &random).status, 204);

        let failing = policy(0, 0, 1.0).with_error_status(418).unwrap();
        assert_eq!(plan(&failing, &random).status, 418);
    }

    #[test]
    fn failure_draw_is_strictly_below_rate() {
        let policy = policy(10, 20, 0.25);

        let mut at_rate = MockDraws::new();
        at_rate.expect_range_inclusive().return_const(15_u64);
        at_rate.expect_next_f64().return_const(0.25);
        let plan_at = plan(&policy, &at_rate);
        assert!(!plan_at.failed);
        assert_eq!(plan_at.delay, Duration::from_millis(15));

        let mut below = MockDraws::new();
        below.expect_range_inclusive().return_const(10_u64);
        below.expect_next_f64().return_const(0.249);
        assert!(plan(&policy, &below).failed);
    }

    #[tokio::test(start_paused = true)]
    async fn inject_sleeps_for_planned_delay() {
        let injector = FaultInjector::new(Arc::new(SeededRandom::new(6)));
        let policy = DelayPolicy::fixed(Duration::from_secs(5)).unwrap();

        let start = tokio::time::Instant::now();
        let outcome = injector.inject(&policy).await;

        assert!(start.elapsed() >= Duration::from_secs(5));
        assert_eq!(outcome.latency_applied, Duration::from_secs(5));
        assert!(outcome.admitted);
        assert!(!outcome.failure_injected);

        let stats = injector.stats();
        assert_eq!(stats.total_calls, 1);
        assert_eq!(stats.total_latency_ms, 5000);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_injection_is_not_counted() {
        let injector = FaultInjector::new(Arc::new(SeededRandom::new(7)));
        let policy = DelayPolicy::fixed(Duration::from_secs(30)).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(1), injector.inject(&policy)).await;

        assert!(result.is_err());
        assert_eq!(injector.stats().total_calls, 0);
    }

    #[tokio::test]
    async fn injected_failure_is_an_outcome() {
        let injector = FaultInjector::new(Arc::new(SeededRandom::new(8)));
        let outcome = injector.inject(&policy(0, 0, 1.0)).await;
        assert!(outcome.admitted);
        assert!(outcome.failure_injected);
        assert_eq!(outcome.simulated_status, 500);
        assert_eq!(injector.stats().failures_injected, 1);

        injector.reset();
        assert_eq!(injector.stats().total_calls, 0);
    }
}
