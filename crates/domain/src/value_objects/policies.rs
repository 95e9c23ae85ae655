//! Validated policies for the rate limiter, circuit breaker and injector
//!
//! Every constructor checks its inputs against [`crate::limits`], so a
//! policy that exists is always within bounds.

use std::time::Duration;

use crate::{
    errors::ConfigurationError,
    limits::{
        MAX_DELAY, MAX_FAILURE_THRESHOLD, MAX_HALF_OPEN_TRIALS, MAX_RATE_LIMIT,
        MAX_RATE_LIMIT_WINDOW, MAX_RECOVERY_TIMEOUT, MAX_STATUS, MIN_RATE_LIMIT_WINDOW,
        MIN_RECOVERY_TIMEOUT, MIN_STATUS,
    },
    value_objects::Probability,
};

#[allow(clippy::cast_precision_loss)]
fn millis_f64(d: Duration) -> f64 {
    d.as_millis() as f64
}

pub(crate) fn check_duration(
    name: &str,
    value: Duration,
    min: Duration,
    max: Duration,
) -> Result<Duration, ConfigurationError> {
    if value < min || value > max {
        return Err(ConfigurationError::out_of_range(
            name,
            millis_f64(value),
            millis_f64(min),
            millis_f64(max),
        ));
    }
    Ok(value)
}

pub(crate) fn check_u32(name: &str, value: u32, min: u32, max: u32) -> Result<u32, ConfigurationError> {
    if value < min || value > max {
        return Err(ConfigurationError::out_of_range(
            name,
            f64::from(value),
            f64::from(min),
            f64::from(max),
        ));
    }
    Ok(value)
}

fn check_status(name: &str, status: u16) -> Result<u16, ConfigurationError> {
    if !(MIN_STATUS..=MAX_STATUS).contains(&status) {
        return Err(ConfigurationError::out_of_range(
            name,
            f64::from(status),
            f64::from(MIN_STATUS),
            f64::from(MAX_STATUS),
        ));
    }
    Ok(status)
}

/// Fixed-window rate limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    limit: u32,
    window: Duration,
}

impl RateLimitPolicy {
    /// Create a policy admitting `limit` calls per `window`
    pub fn new(limit: u32, window: Duration) -> Result<Self, ConfigurationError> {
        Ok(Self {
            limit: check_u32("limit", limit, 1, MAX_RATE_LIMIT)?,
            window: check_duration(
                "window_ms",
                window,
                MIN_RATE_LIMIT_WINDOW,
                MAX_RATE_LIMIT_WINDOW,
            )?,
        })
    }

    /// Calls admitted per window
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Window length
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }
}

/// Circuit breaker thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerPolicy {
    failure_threshold: u32,
    recovery_timeout: Duration,
    half_open_trial_budget: u32,
}

impl Default for BreakerPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            half_open_trial_budget: 1,
        }
    }
}

impl BreakerPolicy {
    /// Create a validated breaker policy
    pub fn new(
        failure_threshold: u32,
        recovery_timeout: Duration,
        half_open_trial_budget: u32,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            failure_threshold: check_u32(
                "failure_threshold",
                failure_threshold,
                1,
                MAX_FAILURE_THRESHOLD,
            )?,
            recovery_timeout: check_duration(
                "recovery_timeout_ms",
                recovery_timeout,
                MIN_RECOVERY_TIMEOUT,
                MAX_RECOVERY_TIMEOUT,
            )?,
            half_open_trial_budget: check_u32(
                "half_open_budget",
                half_open_trial_budget,
                1,
                MAX_HALF_OPEN_TRIALS,
            )?,
        })
    }

    /// Consecutive failures that open the circuit
    #[must_use]
    pub const fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// Time spent open before probing
    #[must_use]
    pub const fn recovery_timeout(&self) -> Duration {
        self.recovery_timeout
    }

    /// Trial calls admitted while half-open
    #[must_use]
    pub const fn half_open_trial_budget(&self) -> u32 {
        self.half_open_trial_budget
    }
}

/// Delay and failure injection policy
#[derive(Debug, Clone, PartialEq)]
pub struct DelayPolicy {
    min_delay: Duration,
    max_delay: Duration,
    failure_rate: Probability,
    error_status: u16,
    success_status: u16,
    error_codes: Vec<u16>,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            failure_rate: Probability::ZERO,
            error_status: 500,
            success_status: 200,
            error_codes: Vec::new(),
        }
    }
}

impl DelayPolicy {
    /// Create a policy with default status codes (500 / 200)
    pub fn new(
        min_delay: Duration,
        max_delay: Duration,
        failure_rate: Probability,
    ) -> Result<Self, ConfigurationError> {
        let min_delay = check_duration("min_delay_ms", min_delay, Duration::ZERO, MAX_DELAY)?;
        let max_delay = check_duration("max_delay_ms", max_delay, Duration::ZERO, MAX_DELAY)?;
        if min_delay > max_delay {
            return Err(ConfigurationError::invalid(
                "min_delay_ms",
                "must not exceed max_delay_ms",
            ));
        }
        Ok(Self {
            min_delay,
            max_delay,
            failure_rate,
            ..Self::default()
        })
    }

    /// Constant delay, never failing
    pub fn fixed(delay: Duration) -> Result<Self, ConfigurationError> {
        Self::new(delay, delay, Probability::ZERO)
    }

    /// Status reported when a failure is injected
    pub fn with_error_status(mut self, status: u16) -> Result<Self, ConfigurationError> {
        self.error_status = check_status("error_status", status)?;
        Ok(self)
    }

    /// Status reported on success
    pub fn with_success_status(mut self, status: u16) -> Result<Self, ConfigurationError> {
        self.success_status = check_status("success_status", status)?;
        Ok(self)
    }

    /// Pool of statuses a failure status is drawn from
    pub fn with_error_codes(mut self, codes: Vec<u16>) -> Result<Self, ConfigurationError> {
        for code in &codes {
            check_status("error_codes", *code)?;
        }
        self.error_codes = codes;
        Ok(self)
    }

    /// Lower delay bound
    #[must_use]
    pub const fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Upper delay bound
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Failure probability
    #[must_use]
    pub const fn failure_rate(&self) -> Probability {
        self.failure_rate
    }

    /// Default failure status
    #[must_use]
    pub const fn error_status(&self) -> u16 {
        self.error_status
    }

    /// Success status
    #[must_use]
    pub const fn success_status(&self) -> u16 {
        self.success_status
    }

    /// Failure status pool (empty means `error_status`)
    #[must_use]
    pub fn error_codes(&self) -> &[u16] {
        &self.error_codes
    }
}
