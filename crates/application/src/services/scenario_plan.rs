//! Translation of a raw scenario request into a validated plan
//!
//! Every parameter is read and checked here, before any limiter, breaker
//! or harness state is touched.

use std::time::Duration;

use domain::{
    BreakerPolicy, CascadeNode, ConfigurationError, DelayPolicy, Parameters,
    Probability, RateLimitPolicy, ScenarioKind, ScenarioRequest, StressKind, StressSpec,
};

/// Default calls per rate-limit window
pub const DEFAULT_RATE_LIMIT: u32 = 10;
/// Default rate-limit window
pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_secs(60);
/// Default cascade depth
pub const DEFAULT_CASCADE_DEPTH: u32 = 3;
/// Default cascade fan-out
pub const DEFAULT_CASCADE_FANOUT: u32 = 1;
/// Status reported by a failed cascade
pub const DEFAULT_CASCADE_ERROR_STATUS: u16 = 502;
/// Default stress job duration
pub const DEFAULT_STRESS_DURATION: Duration = Duration::from_secs(1);

/// Parameters shared by latency and failure scenarios
const DELAY_PARAMETERS: &[&str] = &[
    "min_delay_ms",
    "max_delay_ms",
    "failure_rate",
    "error_status",
    "success_status",
    "error_codes",
];

/// Accepted names for the rate-limit window, in lookup order; all in milliseconds
const WINDOW_PARAMETERS: &[&str] = &["window_ms", "window_duration_ms", "window_duration"];

const RATE_LIMIT_PARAMETERS: &[&str] = &["limit", "window_ms", "window_duration_ms", "window_duration"];

/// Every parameter name `kind` understands
#[must_use]
pub const fn allowed_parameters(kind: ScenarioKind) -> &'static [&'static str] {
    match kind {
        ScenarioKind::Latency | ScenarioKind::Failure => DELAY_PARAMETERS,
        ScenarioKind::RateLimit => RATE_LIMIT_PARAMETERS,
        ScenarioKind::Circuit => &[
            "failure_threshold",
            "recovery_timeout_ms",
            "half_open_budget",
            "action",
            "outcome",
            "failure_rate",
        ],
        ScenarioKind::Cascade => &[
            "depth",
            "fanout",
            "failure_probability",
            "error_status",
            "success_status",
        ],
        ScenarioKind::Stress => &["stress_kind", "intensity", "duration_ms", "wait"],
    }
}

fn reject_unknown(kind: ScenarioKind, params: &Parameters) -> Result<(), ConfigurationError> {
    let allowed = allowed_parameters(kind);
    match params.iter().find(|(name, _)| !allowed.contains(name)) {
        Some((name, _)) => Err(ConfigurationError::UnknownParameter {
            name: name.to_string(),
            kind: kind.to_string(),
        }),
        None => Ok(()),
    }
}

/// What a circuit scenario does with the breaker
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitAction {
    /// Check, simulate the downstream call, record its result
    Call {
        /// Explicit downstream result, drawn from `failure_rate` when absent
        outcome: Option<bool>,
        /// Downstream failure probability
        failure_rate: Probability,
    },
    /// Only ask whether a call would be admitted
    Check,
    /// Only record a result
    Record {
        /// Whether the recorded call succeeded
        succeeded: bool,
    },
}

/// Breaker policy fields supplied with a circuit scenario
///
/// Missing fields keep the value already in force for the key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreakerOverrides {
    /// Consecutive failures that open the breaker
    pub failure_threshold: Option<u32>,
    /// Open-to-half-open delay
    pub recovery_timeout: Option<Duration>,
    /// Half-open trial calls
    pub half_open_budget: Option<u32>,
}

impl BreakerOverrides {
    /// Whether nothing was overridden
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.failure_threshold.is_none()
            && self.recovery_timeout.is_none()
            && self.half_open_budget.is_none()
    }

    /// Merge onto `base`, validating the result
    pub fn apply(&self, base: &BreakerPolicy) -> Result<BreakerPolicy, ConfigurationError> {
        BreakerPolicy::new(
            self.failure_threshold.unwrap_or(base.failure_threshold()),
            self.recovery_timeout.unwrap_or(base.recovery_timeout()),
            self.half_open_budget.unwrap_or(base.half_open_trial_budget()),
        )
    }
}

/// Validated circuit scenario
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircuitPlan {
    /// Policy changes to apply first
    pub overrides: BreakerOverrides,
    /// What to do
    pub action: CircuitAction,
}

/// Validated cascade scenario
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadePlan {
    /// Tree root
    pub root: CascadeNode,
    /// Status when any node failed
    pub error_status: u16,
    /// Status when every node succeeded
    pub success_status: u16,
}

/// Validated stress scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressPlan {
    /// Job to run
    pub spec: StressSpec,
    /// Whether to wait for the job before answering
    pub wait: bool,
}

/// A fully validated scenario, ready to dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioPlan {
    /// Delay with optional failure
    Latency(DelayPolicy),
    /// Probabilistic failure with optional delay
    Failure(DelayPolicy),
    /// Fixed-window rate limit
    RateLimit(RateLimitPolicy),
    /// Circuit breaker interaction
    Circuit(CircuitPlan),
    /// Call tree evaluation
    Cascade(CascadePlan),
    /// Background resource consumption
    Stress(StressPlan),
}

impl ScenarioPlan {
    /// Validate `request` into a plan
    pub fn from_request(request: &ScenarioRequest) -> Result<Self, ConfigurationError> {
        let params = request.parameters();
        reject_unknown(request.kind(), params)?;
        match request.kind() {
            ScenarioKind::Latency => {
                let failure_rate = probability(params, "failure_rate")?.unwrap_or(Probability::ZERO);
                Ok(Self::Latency(delay_policy(params, failure_rate)?))
            },
            ScenarioKind::Failure => {
                let failure_rate = probability(params, "failure_rate")?
                    .ok_or_else(|| ConfigurationError::MissingParameter("failure_rate".into()))?;
                Ok(Self::Failure(delay_policy(params, failure_rate)?))
            },
            ScenarioKind::RateLimit => Ok(Self::RateLimit(rate_limit_policy(params)?)),
            ScenarioKind::Circuit => Ok(Self::Circuit(circuit_plan(params)?)),
            ScenarioKind::Cascade => Ok(Self::Cascade(cascade_plan(params)?)),
            ScenarioKind::Stress => Ok(Self::Stress(stress_plan(params)?)),
        }
    }

    /// Kind this plan was built from
    #[must_use]
    pub const fn kind(&self) -> ScenarioKind {
        match self {
            Self::Latency(_) => ScenarioKind::Latency,
            Self::Failure(_) => ScenarioKind::Failure,
            Self::RateLimit(_) => ScenarioKind::RateLimit,
            Self::Circuit(_) => ScenarioKind::Circuit,
            Self::Cascade(_) => ScenarioKind::Cascade,
            Self::Stress(_) => ScenarioKind::Stress,
        }
    }
}

fn millis(params: &Parameters, name: &str) -> Result<Option<Duration>, ConfigurationError> {
    params.duration_ms_in(name, Duration::ZERO, Duration::from_millis(u64::MAX))
}

fn whole(params: &Parameters, name: &str) -> Result<Option<u32>, ConfigurationError> {
    params.u32_in(name, 0, u32::MAX)
}

fn status(params: &Parameters, name: &str) -> Result<Option<u16>, ConfigurationError> {
    Ok(params
        .u32_in(name, 0, u32::from(u16::MAX))?
        .and_then(|s| u16::try_from(s).ok()))
}

fn probability(params: &Parameters, name: &str) -> Result<Option<Probability>, ConfigurationError> {
    params
        .number(name)?
        .map(|p| Probability::new(name, p))
        .transpose()
}

fn delay_policy(
    params: &Parameters,
    failure_rate: Probability,
) -> Result<DelayPolicy, ConfigurationError> {
    let min = millis(params, "min_delay_ms")?.unwrap_or(Duration::ZERO);
    let max = millis(params, "max_delay_ms")?.unwrap_or(min);

    let mut policy = DelayPolicy::new(min, max, failure_rate)?;
    if let Some(code) = status(params, "error_status")? {
        policy = policy.with_error_status(code)?;
    }
    if let Some(code) = status(params, "success_status")? {
        policy = policy.with_success_status(code)?;
    }
    if let Some(codes) = params.status_list("error_codes")? {
        policy = policy.with_error_codes(codes)?;
    }
    Ok(policy)
}

fn rate_limit_policy(params: &Parameters) -> Result<RateLimitPolicy, ConfigurationError> {
    let limit = whole(params, "limit")?.unwrap_or(DEFAULT_RATE_LIMIT);
    let mut window = None;
    for name in WINDOW_PARAMETERS {
        if let Some(value) = millis(params, name)? {
            window = Some(value);
            break;
        }
    }
    RateLimitPolicy::new(limit, window.unwrap_or(DEFAULT_RATE_WINDOW))
}

fn circuit_plan(params: &Parameters) -> Result<CircuitPlan, ConfigurationError> {
    let overrides = BreakerOverrides {
        failure_threshold: whole(params, "failure_threshold")?,
        recovery_timeout: millis(params, "recovery_timeout_ms")?,
        half_open_budget: whole(params, "half_open_budget")?,
    };
    // Each override must be valid on its own, whatever the stored policy is.
    overrides.apply(&BreakerPolicy::default())?;

    let outcome = match params.text("outcome") {
        None => None,
        Some(raw) => Some(parse_outcome(&raw)?),
    };

    let action = match params.text("action").as_deref().map(str::trim) {
        None | Some("call") => CircuitAction::Call {
            outcome,
            failure_rate: probability(params, "failure_rate")?.unwrap_or(Probability::ZERO),
        },
        Some("check") => CircuitAction::Check,
        Some("record") => CircuitAction::Record {
            succeeded: outcome
                .ok_or_else(|| ConfigurationError::MissingParameter("outcome".into()))?,
        },
        Some(other) => {
            return Err(ConfigurationError::invalid(
                "action",
                format!("'{other}' is not one of call, check, record"),
            ));
        },
    };

    Ok(CircuitPlan { overrides, action })
}

fn parse_outcome(raw: &str) -> Result<bool, ConfigurationError> {
    match raw.trim().to_lowercase().as_str() {
        "success" | "ok" | "true" => Ok(true),
        "failure" | "fail" | "false" => Ok(false),
        other => Err(ConfigurationError::invalid(
            "outcome",
            format!("'{other}' is not one of success, failure"),
        )),
    }
}

fn cascade_plan(params: &Parameters) -> Result<CascadePlan, ConfigurationError> {
    let root = CascadeNode::new(
        whole(params, "depth")?.unwrap_or(DEFAULT_CASCADE_DEPTH),
        whole(params, "fanout")?.unwrap_or(DEFAULT_CASCADE_FANOUT),
        probability(params, "failure_probability")?.unwrap_or(Probability::ZERO),
    )?;

    // Reuse the injector's status validation.
    let mut statuses = DelayPolicy::default().with_error_status(DEFAULT_CASCADE_ERROR_STATUS)?;
    if let Some(code) = status(params, "error_status")? {
        statuses = statuses.with_error_status(code)?;
    }
    if let Some(code) = status(params, "success_status")? {
        statuses = statuses.with_success_status(code)?;
    }

    Ok(CascadePlan {
        root,
        error_status: statuses.error_status(),
        success_status: statuses.success_status(),
    })
}

fn stress_plan(params: &Parameters) -> Result<StressPlan, ConfigurationError> {
    let kind: StressKind = params
        .text("stress_kind")
        .ok_or_else(|| ConfigurationError::MissingParameter("stress_kind".into()))?
        .parse()?;
    let intensity = whole(params, "intensity")?
        .ok_or_else(|| ConfigurationError::MissingParameter("intensity".into()))?;
    let duration = millis(params, "duration_ms")?.unwrap_or(DEFAULT_STRESS_DURATION);

    Ok(StressPlan {
        spec: StressSpec::new(kind, intensity, duration)?,
        wait: params.bool("wait")?.unwrap_or(false),
    })
}
