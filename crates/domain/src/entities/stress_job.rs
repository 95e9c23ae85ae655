//! Stress job handles and status reports

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::value_objects::{StressExit, StressJobId, StressKind, StressSpec};

/// Returned when a stress job is started
///
/// Only the id is needed to query or cancel the job later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressJobHandle {
    /// Job identifier
    pub job_id: StressJobId,
    /// Resource being consumed
    pub kind: StressKind,
    /// Requested intensity
    pub intensity: u32,
    /// When the job was started
    pub started_at: Instant,
    /// When the job stops on its own
    pub deadline: Instant,
}

impl StressJobHandle {
    /// Create a handle for a job started at `started_at`
    #[must_use]
    pub fn new(job_id: StressJobId, spec: &StressSpec, started_at: Instant) -> Self {
        Self {
            job_id,
            kind: spec.kind(),
            intensity: spec.intensity(),
            started_at,
            deadline: started_at + spec.duration(),
        }
    }

    /// Configured run time
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.deadline.saturating_duration_since(self.started_at)
    }
}

/// Point-in-time view of a stress job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressJobStatus {
    /// Job identifier
    pub job_id: StressJobId,
    /// Resource being consumed
    pub kind: StressKind,
    /// Requested intensity
    pub intensity: u32,
    /// Whether the job still holds resources
    pub running: bool,
    /// Time since start (or total run time once finished)
    pub elapsed_ms: u64,
    /// Units actually reached, see [`StressKind::achieved_unit`]
    pub achieved: u64,
    /// How the job ended, once it has
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub exit: Option<StressExit>,
}

impl StressJobStatus {
    /// Whether the job has finished
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.exit.is_some()
    }

    /// Elapsed time as a duration
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}
