//! Property-based tests for domain value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use std::time::Duration;

use domain::{
    entities::{ParamValue, Parameters},
    value_objects::{
        BreakerPolicy, CascadeNode, DelayPolicy, Probability, RateLimitPolicy, StressKind,
        StressSpec,
    },
};
use proptest::prelude::*;

// ============================================================================
// Probability Property Tests
// ============================================================================

mod probability_tests {
    use super::*;

    proptest! {
        #[test]
        fn unit_interval_accepted(p in 0.0f64..=1.0f64) {
            let prob = Probability::new("p", p).unwrap();
            prop_assert!((prob.value() - p).abs() < f64::EPSILON);
        }

        #[test]
        fn outside_unit_interval_rejected(
            p in prop_oneof![(-1000.0f64..-0.000_001f64), (1.000_001f64..1000.0f64)]
        ) {
            prop_assert!(Probability::new("p", p).is_err());
        }

        #[test]
        fn zero_never_hits(draw in 0.0f64..1.0f64) {
            prop_assert!(!Probability::ZERO.hit(draw));
        }

        #[test]
        fn one_always_hits(draw in 0.0f64..1.0f64) {
            prop_assert!(Probability::ONE.hit(draw));
        }
    }
}

// ============================================================================
// Policy Property Tests
// ============================================================================

mod policy_tests {
    use super::*;

    proptest! {
        #[test]
        fn rate_limit_in_bounds_accepted(limit in 1u32..=10_000, window_ms in 1u64..=3_600_000) {
            let policy = RateLimitPolicy::new(limit, Duration::from_millis(window_ms)).unwrap();
            prop_assert_eq!(policy.limit(), limit);
        }

        #[test]
        fn rate_limit_above_cap_rejected(limit in 10_001u32..1_000_000) {
            prop_assert!(RateLimitPolicy::new(limit, Duration::from_secs(1)).is_err());
        }

        #[test]
        fn breaker_threshold_bounds(threshold in 0u32..2000) {
            let result = BreakerPolicy::new(threshold, Duration::from_secs(1), 1);
            prop_assert_eq!(result.is_ok(), (1..=1000).contains(&threshold));
        }

        #[test]
        fn delay_order_enforced(a in 0u64..=30_000, b in 0u64..=30_000) {
            let result = DelayPolicy::new(
                Duration::from_millis(a),
                Duration::from_millis(b),
                Probability::ZERO,
            );
            prop_assert_eq!(result.is_ok(), a <= b);
        }

        #[test]
        fn status_codes_bounded(status in 0u16..1000) {
            let result = DelayPolicy::default().with_error_status(status);
            prop_assert_eq!(result.is_ok(), (100..=599).contains(&status));
        }
    }
}

// ============================================================================
// Cascade Property Tests
// ============================================================================

mod cascade_tests {
    use super::*;

    proptest! {
        #[test]
        fn accepted_trees_stay_under_ceiling(depth in 0u32..=10, fanout in 1u32..=20) {
            if let Ok(node) = CascadeNode::new(depth, fanout, Probability::ZERO) {
                prop_assert!(node.worst_case_nodes() <= domain::limits::MAX_CASCADE_NODES);
                prop_assert!(node.worst_case_nodes() > u64::from(depth));
            }
        }

        #[test]
        fn deep_trees_rejected(depth in 11u32..100) {
            prop_assert!(CascadeNode::new(depth, 1, Probability::ZERO).is_err());
        }
    }
}

// ============================================================================
// Stress Spec Property Tests
// ============================================================================

mod stress_tests {
    use super::*;

    proptest! {
        #[test]
        fn intensity_within_kind_max(
            kind in prop_oneof![
                Just(StressKind::Cpu),
                Just(StressKind::Memory),
                Just(StressKind::Connections)
            ],
            intensity in 0u32..200
        ) {
            let result = StressSpec::new(kind, intensity, Duration::from_millis(100));
            let max = StressSpec::max_intensity(kind);
            prop_assert_eq!(result.is_ok(), intensity >= 1 && intensity <= max);
        }
    }
}

// ============================================================================
// Parameters Property Tests
// ============================================================================

mod parameter_tests {
    use super::*;

    proptest! {
        #[test]
        fn numeric_query_values_coerced(n in 0u32..1_000_000) {
            let params = Parameters::from_query([("n", n.to_string())]);
            prop_assert_eq!(params.u64_in("n", 0, u64::MAX).unwrap(), Some(u64::from(n)));
        }

        #[test]
        fn text_never_panics(s in "\\PC*") {
            let value = ParamValue::from_raw(&s);
            let params = Parameters::new().with("x", value);
            let _ = params.number("x");
            let _ = params.bool("x");
            let _ = params.status_list("x");
        }

        #[test]
        fn out_of_range_numbers_rejected(n in 101u32..10_000) {
            let params = Parameters::new().with("depth", n);
            prop_assert!(params.u32_in("depth", 0, 100).is_err());
        }
    }
}
