//! Simulation Service - Single entry point for every scenario kind
//!
//! Validates a [`ScenarioRequest`] into a [`ScenarioPlan`] and dispatches it
//! to the matching engine port. Injected failures come back as an
//! [`Outcome`]; only invalid configuration is an error.

use std::{sync::Arc, time::Duration};

use domain::{
    BreakerPhase, BreakerPolicy, Outcome, RateLimitPolicy, ScenarioRequest, StressJobId,
    StressJobStatus,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{
        BreakerDecision, BreakerSnapshot, CascadePort, CircuitBreakerPort, FaultInjectorPort,
        InjectionStatsSnapshot, RandomPort, RateLimiterPort, StressHarnessPort,
    },
    services::scenario_plan::{
        BreakerOverrides, CascadePlan, CircuitAction, CircuitPlan, ScenarioPlan, StressPlan,
    },
};

/// Status reported when a call is rate limited
pub const RATE_LIMITED_STATUS: u16 = 429;
/// Status reported when a breaker short-circuits a call
pub const SHORT_CIRCUIT_STATUS: u16 = 503;
/// Status reported when a simulated downstream call fails
pub const DOWNSTREAM_FAILURE_STATUS: u16 = 500;
/// Status reported when a stress job was started in the background
pub const STRESS_ACCEPTED_STATUS: u16 = 202;

#[allow(clippy::cast_possible_truncation)]
fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}

/// Entries removed by one maintenance sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Idle rate-limit keys evicted
    pub rate_limit_keys: usize,
    /// Idle breaker keys evicted
    pub breaker_keys: usize,
    /// Finished stress jobs purged
    pub stress_jobs: usize,
}

impl SweepReport {
    /// Total entries removed
    #[must_use]
    pub const fn total(&self) -> usize {
        self.rate_limit_keys + self.breaker_keys + self.stress_jobs
    }
}

/// Facade over the simulation engines
pub struct SimulationService {
    rate_limiter: Arc<dyn RateLimiterPort>,
    breakers: Arc<dyn CircuitBreakerPort>,
    injector: Arc<dyn FaultInjectorPort>,
    cascade: Arc<dyn CascadePort>,
    stress: Arc<dyn StressHarnessPort>,
    random: Arc<dyn RandomPort>,
}

impl std::fmt::Debug for SimulationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationService").finish_non_exhaustive()
    }
}

impl SimulationService {
    /// Create a new simulation service
    pub fn new(
        rate_limiter: Arc<dyn RateLimiterPort>,
        breakers: Arc<dyn CircuitBreakerPort>,
        injector: Arc<dyn FaultInjectorPort>,
        cascade: Arc<dyn CascadePort>,
        stress: Arc<dyn StressHarnessPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            rate_limiter,
            breakers,
            injector,
            cascade,
            stress,
            random,
        }
    }

    /// Run one scenario
    ///
    /// Configuration is fully validated before any engine state changes.
    #[instrument(skip(self, request), fields(key = %request.key(), kind = %request.kind()))]
    pub async fn run(&self, request: ScenarioRequest) -> Result<Outcome, ApplicationError> {
        let plan = ScenarioPlan::from_request(&request).inspect_err(|e| {
            warn!(error = %e, "Rejected scenario configuration");
        })?;
        let key = request.key();

        let outcome = match plan {
            ScenarioPlan::Latency(policy) | ScenarioPlan::Failure(policy) => {
                let outcome = self.injector.inject(&policy).await;
                outcome
                    .with_detail("min_delay_ms", millis(policy.min_delay()))
                    .with_detail("max_delay_ms", millis(policy.max_delay()))
                    .with_detail("failure_rate", policy.failure_rate().value())
            },
            ScenarioPlan::RateLimit(policy) => self.run_rate_limit(key, &policy),
            ScenarioPlan::Circuit(plan) => self.run_circuit(key, plan)?,
            ScenarioPlan::Cascade(plan) => self.run_cascade(&plan)?,
            ScenarioPlan::Stress(plan) => self.run_stress(plan).await?,
        };

        debug!(
            status = outcome.simulated_status,
            admitted = outcome.admitted,
            failure_injected = outcome.failure_injected,
            latency_ms = millis(outcome.latency_applied),
            "Scenario complete"
        );

        Ok(outcome)
    }

    fn run_rate_limit(&self, key: &str, policy: &RateLimitPolicy) -> Outcome {
        let decision = self.rate_limiter.check(key, policy);

        let outcome = if decision.admitted {
            Outcome::admitted(200)
        } else {
            let retry_after = decision.retry_after.unwrap_or(Duration::ZERO);
            Outcome::rejected(RATE_LIMITED_STATUS).with_detail("retry_after_ms", millis(retry_after))
        };

        outcome
            .with_detail("limit", decision.limit)
            .with_detail("count", decision.count)
            .with_detail("remaining", decision.remaining)
            .with_detail("window_ms", millis(policy.window()))
    }

    fn run_circuit(&self, key: &str, plan: CircuitPlan) -> Result<Outcome, ApplicationError> {
        self.apply_overrides(key, &plan.overrides)?;

        let outcome = match plan.action {
            CircuitAction::Check => {
                let decision = self.breakers.check(key);
                if decision.admitted {
                    Outcome::admitted(200).with_phase(decision.phase)
                } else {
                    short_circuit(&decision)
                }
            },
            CircuitAction::Record { succeeded } => {
                let phase = self.breakers.record(key, succeeded);
                Outcome::admitted(200)
                    .with_phase(phase)
                    .with_detail("recorded", downstream_label(succeeded))
            },
            CircuitAction::Call {
                outcome,
                failure_rate,
            } => {
                let decision = self.breakers.check(key);
                if !decision.admitted {
                    return Ok(short_circuit(&decision));
                }

                let succeeded = outcome.unwrap_or_else(|| !failure_rate.hit(self.random.next_f64()));
                let phase = self.breakers.record(key, succeeded);
                let status = if succeeded {
                    200
                } else {
                    DOWNSTREAM_FAILURE_STATUS
                };

                Outcome::admitted(status)
                    .with_failure(!succeeded)
                    .with_phase(phase)
                    .with_detail("downstream", downstream_label(succeeded))
            },
        };

        Ok(outcome)
    }

    fn apply_overrides(
        &self,
        key: &str,
        overrides: &BreakerOverrides,
    ) -> Result<(), ApplicationError> {
        if overrides.is_empty() {
            return Ok(());
        }

        let current = self.breaker_policy(key);
        let policy = overrides.apply(&current)?;
        if policy != current {
            debug!(key = %key, "Replacing breaker policy");
            self.breakers.configure(key, policy, None);
        }
        Ok(())
    }

    fn run_cascade(&self, plan: &CascadePlan) -> Result<Outcome, ApplicationError> {
        let report = self.cascade.simulate(&plan.root);
        let status = if report.failed {
            plan.error_status
        } else {
            plan.success_status
        };

        let detail = serde_json::to_value(&report)
            .map_err(|e| ApplicationError::Internal(format!("Cascade report serialization: {e}")))?;

        Ok(Outcome::admitted(status)
            .with_failure(report.failed)
            .with_detail("depth", plan.root.depth())
            .with_detail("fanout", plan.root.fanout())
            .with_detail("cascade", detail))
    }

    async fn run_stress(&self, plan: StressPlan) -> Result<Outcome, ApplicationError> {
        let handle = self.stress.start(plan.spec);
        info!(
            job_id = %handle.job_id,
            stress_kind = %handle.kind,
            intensity = handle.intensity,
            wait = plan.wait,
            "Started stress job"
        );

        let base = |status: u16| {
            Outcome::admitted(status)
                .with_detail("job_id", handle.job_id.to_string())
                .with_detail("stress_kind", handle.kind.as_str())
                .with_detail("intensity", handle.intensity)
                .with_detail("duration_ms", millis(handle.duration()))
        };

        if !plan.wait {
            return Ok(base(STRESS_ACCEPTED_STATUS));
        }

        let status = self.stress.wait(handle.job_id).await.ok_or_else(|| {
            ApplicationError::Internal(format!("Stress job {} disappeared", handle.job_id))
        })?;

        let mut outcome = base(200)
            .with_latency(status.elapsed())
            .with_detail("achieved", status.achieved)
            .with_detail("achieved_unit", status.kind.achieved_unit())
            .with_detail("elapsed_ms", status.elapsed_ms);
        if let Some(exit) = status.exit {
            outcome = outcome.with_detail("exit", exit.to_string());
        }
        Ok(outcome)
    }

    /// Replace a breaker's policy, optionally forcing its phase
    #[instrument(skip(self, policy))]
    pub fn configure_breaker(
        &self,
        key: &str,
        policy: BreakerPolicy,
        force: Option<BreakerPhase>,
    ) -> BreakerSnapshot {
        info!(
            failure_threshold = policy.failure_threshold(),
            recovery_timeout_ms = millis(policy.recovery_timeout()),
            half_open_budget = policy.half_open_trial_budget(),
            "Configuring breaker"
        );
        self.breakers.configure(key, policy, force)
    }

    /// Policy in force for `key`, or the one a new breaker would get
    #[must_use]
    pub fn breaker_policy(&self, key: &str) -> BreakerPolicy {
        self.breakers
            .snapshot(key)
            .map_or_else(|| self.breakers.default_policy(), |s| s.policy)
    }

    /// Current breaker state for `key`
    #[must_use]
    pub fn breaker_snapshot(&self, key: &str) -> Option<BreakerSnapshot> {
        self.breakers.snapshot(key)
    }

    /// Status of a stress job
    pub fn stress_status(&self, job_id: &str) -> Result<StressJobStatus, ApplicationError> {
        let id = parse_job_id(job_id)?;
        self.stress
            .status(id)
            .ok_or_else(|| ApplicationError::JobNotFound(job_id.to_string()))
    }

    /// Cancel a stress job and return its status
    ///
    /// Cancelling a job that already finished is not an error.
    #[instrument(skip(self))]
    pub fn cancel_stress(&self, job_id: &str) -> Result<StressJobStatus, ApplicationError> {
        let id = parse_job_id(job_id)?;
        if !self.stress.cancel(id) {
            return Err(ApplicationError::JobNotFound(job_id.to_string()));
        }
        info!("Cancelled stress job");
        self.stress
            .status(id)
            .ok_or_else(|| ApplicationError::JobNotFound(job_id.to_string()))
    }

    /// Injector counters
    #[must_use]
    pub fn injection_stats(&self) -> InjectionStatsSnapshot {
        self.injector.stats()
    }

    /// Evict idle keys and purge old finished jobs
    pub fn sweep(&self, idle: Duration, job_retention: Duration) -> SweepReport {
        let report = SweepReport {
            rate_limit_keys: self.rate_limiter.evict_idle(idle),
            breaker_keys: self.breakers.evict_idle(idle),
            stress_jobs: self.stress.purge_finished(job_retention),
        };
        if report.total() > 0 {
            debug!(
                rate_limit_keys = report.rate_limit_keys,
                breaker_keys = report.breaker_keys,
                stress_jobs = report.stress_jobs,
                "Swept simulation state"
            );
        }
        report
    }
}

fn short_circuit(decision: &BreakerDecision) -> Outcome {
    let mut outcome = Outcome::rejected(SHORT_CIRCUIT_STATUS).with_phase(decision.phase);
    if let Some(reason) = decision.reason {
        outcome = outcome.with_detail("reason", reason.as_str());
    }
    if let Some(retry_after) = decision.retry_after {
        outcome = outcome.with_detail("retry_after_ms", millis(retry_after));
    }
    outcome
}

const fn downstream_label(succeeded: bool) -> &'static str {
    if succeeded { "success" } else { "failure" }
}

fn parse_job_id(raw: &str) -> Result<StressJobId, ApplicationError> {
    StressJobId::parse(raw).map_err(|_| ApplicationError::JobNotFound(raw.to_string()))
}
