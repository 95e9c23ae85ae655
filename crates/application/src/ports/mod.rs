//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! the simulation engines. Adapters in the infrastructure layer implement
//! these ports.

mod cascade_port;
mod circuit_breaker_port;
mod clock_port;
mod fault_injector_port;
mod random_port;
mod rate_limiter_port;
mod stress_harness_port;

pub use cascade_port::CascadePort;
#[cfg(test)]
pub use cascade_port::MockCascadePort;
pub use cascade_port::CascadeReport;
#[cfg(test)]
pub use circuit_breaker_port::MockCircuitBreakerPort;
pub use circuit_breaker_port::{
    BreakerDecision, BreakerSnapshot, CircuitBreakerPort, RejectReason,
};
pub use clock_port::ClockPort;
#[cfg(test)]
pub use clock_port::MockClockPort;
#[cfg(test)]
pub use fault_injector_port::MockFaultInjectorPort;
pub use fault_injector_port::{FaultInjectorPort, InjectionPlan, InjectionStatsSnapshot};
#[cfg(test)]
pub use random_port::MockRandomPort;
pub use random_port::{RandomPort, choose};
#[cfg(test)]
pub use rate_limiter_port::MockRateLimiterPort;
pub use rate_limiter_port::{RateDecision, RateLimiterPort};
#[cfg(test)]
pub use stress_harness_port::MockStressHarnessPort;
pub use stress_harness_port::StressHarnessPort;
