//! Value Objects - Immutable, identity-less domain primitives

mod breaker_phase;
mod cascade_node;
pub(crate) mod policies;
mod probability;
mod scenario_kind;
mod stress;
mod stress_spec;

pub use breaker_phase::BreakerPhase;
pub use cascade_node::CascadeNode;
pub use policies::{BreakerPolicy, DelayPolicy, RateLimitPolicy};
pub use probability::Probability;
pub use scenario_kind::ScenarioKind;
pub use stress::{StressExit, StressJobId, StressKind};
pub use stress_spec::StressSpec;
