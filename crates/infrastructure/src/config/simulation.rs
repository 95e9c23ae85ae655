//! Simulation engine configuration.

use std::time::Duration;

use domain::{BreakerPolicy, ConfigurationError};
use serde::{Deserialize, Serialize};

use crate::stress::StressBudgets;

/// Simulation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seed for reproducible runs; fresh entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,

    /// Keys idle longer than this are evicted from the rate-limit and breaker registries
    #[serde(default = "default_registry_idle_ttl")]
    pub registry_idle_ttl_secs: u64,

    /// Interval between registry and stress-job sweeps
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,

    /// How long finished stress jobs stay queryable
    #[serde(default = "default_job_retention")]
    pub job_retention_secs: u64,

    /// Memory all stress jobs together may hold, in MiB
    #[serde(default = "default_memory_budget")]
    pub memory_budget_mib: u32,

    /// Simulated connections all stress jobs together may hold
    #[serde(default = "default_connection_pool")]
    pub connection_pool_size: u32,

    /// CPU stress jobs allowed to spin at once
    #[serde(default = "default_cpu_jobs")]
    pub cpu_job_slots: u32,

    /// Failures that open a breaker created without overrides
    #[serde(default = "default_failure_threshold")]
    pub breaker_failure_threshold: u32,

    /// Open duration of a breaker created without overrides, in milliseconds
    #[serde(default = "default_recovery_timeout")]
    pub breaker_recovery_timeout_ms: u64,

    /// Half-open trial budget of a breaker created without overrides
    #[serde(default = "default_half_open_budget")]
    pub breaker_half_open_budget: u32,
}

const fn default_registry_idle_ttl() -> u64 {
    600
}

const fn default_cleanup_interval() -> u64 {
    60
}

const fn default_job_retention() -> u64 {
    300
}

const fn default_memory_budget() -> u32 {
    256
}

const fn default_connection_pool() -> u32 {
    200
}

const fn default_cpu_jobs() -> u32 {
    4
}

const fn default_failure_threshold() -> u32 {
    5
}

const fn default_recovery_timeout() -> u64 {
    30_000
}

const fn default_half_open_budget() -> u32 {
    1
}

impl SimulationConfig {
    /// Idle TTL for registry entries
    #[must_use]
    pub const fn registry_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.registry_idle_ttl_secs)
    }

    /// Sweep interval, never shorter than one second
    #[must_use]
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }

    /// Retention for finished stress jobs
    #[must_use]
    pub const fn job_retention(&self) -> Duration {
        Duration::from_secs(self.job_retention_secs)
    }

    /// Shared stress budgets
    #[must_use]
    pub const fn stress_budgets(&self) -> StressBudgets {
        StressBudgets {
            memory_mib: self.memory_budget_mib,
            connections: self.connection_pool_size,
            cpu_jobs: self.cpu_job_slots,
        }
    }

    /// Validated policy for breakers created without overrides
    pub fn default_breaker_policy(&self) -> Result<BreakerPolicy, ConfigurationError> {
        BreakerPolicy::new(
            self.breaker_failure_threshold,
            Duration::from_millis(self.breaker_recovery_timeout_ms),
            self.breaker_half_open_budget,
        )
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            registry_idle_ttl_secs: default_registry_idle_ttl(),
            cleanup_interval_secs: default_cleanup_interval(),
            job_retention_secs: default_job_retention(),
            memory_budget_mib: default_memory_budget(),
            connection_pool_size: default_connection_pool(),
            cpu_job_slots: default_cpu_jobs(),
            breaker_failure_threshold: default_failure_threshold(),
            breaker_recovery_timeout_ms: default_recovery_timeout(),
            breaker_half_open_budget: default_half_open_budget(),
        }
    }
}
