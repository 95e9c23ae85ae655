//! End-to-end tests of the assembled simulation engine

use std::{sync::Arc, time::Duration};

use application::ApplicationError;
use domain::{BreakerPhase, Parameters, ScenarioKind, ScenarioRequest};
use infrastructure::{
    ManualClock, SeededRandom, SimulationConfig, build_simulation_service,
    build_simulation_service_with,
};

fn request(key: &str, kind: ScenarioKind, params: Parameters) -> ScenarioRequest {
    ScenarioRequest::new(key, kind, params)
}

fn seeded_config() -> SimulationConfig {
    SimulationConfig {
        seed: Some(7),
        ..SimulationConfig::default()
    }
}

#[tokio::test]
async fn rate_limit_admits_then_rejects() {
    let service = build_simulation_service(&seeded_config()).unwrap();
    let params = Parameters::new().with("limit", 2_u32).with("window_ms", 1000_u32);

    let first = service
        .run(request("a", ScenarioKind::RateLimit, params.clone()))
        .await
        .unwrap();
    let second = service
        .run(request("a", ScenarioKind::RateLimit, params.clone()))
        .await
        .unwrap();
    let third = service
        .run(request("a", ScenarioKind::RateLimit, params))
        .await
        .unwrap();

    assert!(first.admitted);
    assert!(second.admitted);
    assert!(!third.admitted);
    assert_eq!(third.simulated_status, 429);
    assert!(third.detail("retry_after_ms").is_some());
}

#[tokio::test]
async fn rate_limit_window_resets_on_manual_clock() {
    let clock = Arc::new(ManualClock::new());
    let service = build_simulation_service_with(
        &seeded_config(),
        clock.clone(),
        Arc::new(SeededRandom::new(1)),
    )
    .unwrap();
    let params = Parameters::new().with("limit", 1_u32).with("window_ms", 1000_u32);

    let req = || request("b", ScenarioKind::RateLimit, params.clone());

    assert!(service.run(req()).await.unwrap().admitted);
    assert!(!service.run(req()).await.unwrap().admitted);
    clock.advance(Duration::from_millis(1000));
    assert!(service.run(req()).await.unwrap().admitted);
}

#[tokio::test]
async fn window_duration_sets_the_window() {
    let clock = Arc::new(ManualClock::new());
    let service = build_simulation_service_with(
        &seeded_config(),
        clock.clone(),
        Arc::new(SeededRandom::new(3)),
    )
    .unwrap();
    let params = Parameters::from_query([("limit", "2"), ("window_duration", "1000")]);
    let req = || request("a", ScenarioKind::RateLimit, params.clone());

    assert!(service.run(req()).await.unwrap().admitted);
    assert!(service.run(req()).await.unwrap().admitted);
    let third = service.run(req()).await.unwrap();
    assert!(!third.admitted);
    assert_eq!(third.detail("retry_after_ms"), Some(&serde_json::Value::from(1000)));

    clock.advance(Duration::from_secs(1));
    assert!(service.run(req()).await.unwrap().admitted);
}

#[tokio::test]
async fn misspelled_parameter_fails_before_any_delay() {
    let service = build_simulation_service(&seeded_config()).unwrap();
    let result = service
        .run(request(
            "a",
            ScenarioKind::Latency,
            Parameters::from_query([("max_dealy_ms", "5000")]),
        ))
        .await;

    assert!(matches!(result, Err(ApplicationError::Configuration(_))));
    assert_eq!(service.injection_stats().total_calls, 0);
}

#[tokio::test]
async fn circuit_opens_and_recovers() {
    let clock = Arc::new(ManualClock::new());
    let service = build_simulation_service_with(
        &seeded_config(),
        clock.clone(),
        Arc::new(SeededRandom::new(2)),
    )
    .unwrap();
    let failing = Parameters::new()
        .with("failure_threshold", 2_u32)
        .with("recovery_timeout_ms", 500_u32)
        .with("outcome", "failure");

    for _ in 0..2 {
        service
            .run(request("svc", ScenarioKind::Circuit, failing.clone()))
            .await
            .unwrap();
    }
    let rejected = service
        .run(request("svc", ScenarioKind::Circuit, failing))
        .await
        .unwrap();
    assert!(!rejected.admitted);
    assert_eq!(rejected.simulated_status, 503);
    assert_eq!(rejected.breaker_phase, Some(BreakerPhase::Open));

    clock.advance(Duration::from_millis(500));
    let trial = service
        .run(request(
            "svc",
            ScenarioKind::Circuit,
            Parameters::new().with("outcome", "success"),
        ))
        .await
        .unwrap();
    assert!(trial.admitted);
    assert_eq!(trial.breaker_phase, Some(BreakerPhase::Closed));
}

#[tokio::test]
async fn invalid_parameters_are_configuration_errors() {
    let service = build_simulation_service(&seeded_config()).unwrap();
    let params = Parameters::new().with("depth", 11_u32);

    let err = service
        .run(request("c", ScenarioKind::Cascade, params))
        .await
        .unwrap_err();

    assert!(matches!(err, ApplicationError::Configuration(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn seeded_engines_agree() {
    let params = Parameters::new()
        .with("depth", 4_u32)
        .with("fanout", 3_u32)
        .with("failure_probability", 0.2);

    let a = build_simulation_service(&seeded_config()).unwrap();
    let b = build_simulation_service(&seeded_config()).unwrap();
    for _ in 0..10 {
        let left = a
            .run(request("k", ScenarioKind::Cascade, params.clone()))
            .await
            .unwrap();
        let right = b
            .run(request("k", ScenarioKind::Cascade, params.clone()))
            .await
            .unwrap();
        assert_eq!(left, right);
    }
}

#[tokio::test]
async fn stress_wait_reports_achievement() {
    let service = build_simulation_service(&seeded_config()).unwrap();
    let params = Parameters::new()
        .with("stress_kind", "connections")
        .with("intensity", 5_u32)
        .with("duration_ms", 20_u32)
        .with("wait", true);

    let outcome = service
        .run(request("s", ScenarioKind::Stress, params))
        .await
        .unwrap();

    assert_eq!(outcome.simulated_status, 200);
    assert_eq!(outcome.detail("achieved"), Some(&serde_json::Value::from(5)));
}

#[test]
fn invalid_default_breaker_policy_fails_assembly() {
    let config = SimulationConfig {
        breaker_half_open_budget: 0,
        ..SimulationConfig::default()
    };
    assert!(build_simulation_service(&config).is_err());
}

#[test]
fn latency_runs_outside_async_tests() {
    let service = build_simulation_service(&seeded_config()).unwrap();
    let params = Parameters::new().with("min_delay_ms", 5_u32);

    let outcome = tokio_test::block_on(service.run(request("l", ScenarioKind::Latency, params)))
        .unwrap();

    assert_eq!(outcome.latency_applied, Duration::from_millis(5));
    assert!(outcome.admitted);
}
