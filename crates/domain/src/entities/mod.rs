//! Domain entities - Scenario requests, outcomes and stress jobs

mod outcome;
mod scenario;
mod stress_job;

pub use outcome::Outcome;
pub use scenario::{ParamValue, Parameters, ScenarioRequest};
pub use stress_job::{StressJobHandle, StressJobStatus};
