//! Stress harness port

use std::time::Duration;

use async_trait::async_trait;
use domain::{StressJobHandle, StressJobId, StressJobStatus, StressSpec};
#[cfg(test)]
use mockall::automock;

/// Runs bounded, cancellable resource-consumption jobs
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StressHarnessPort: Send + Sync + std::fmt::Debug {
    /// Start a job in the background
    fn start(&self, spec: StressSpec) -> StressJobHandle;

    /// Ask a job to stop
    ///
    /// Returns `false` only for unknown ids; cancelling a finished job is
    /// a no-op that still returns `true`.
    fn cancel(&self, job_id: StressJobId) -> bool;

    /// Current status, `None` for unknown ids
    fn status(&self, job_id: StressJobId) -> Option<StressJobStatus>;

    /// Wait for a job to finish and return its final status
    async fn wait(&self, job_id: StressJobId) -> Option<StressJobStatus>;

    /// Forget finished jobs older than `older_than`, returning how many
    fn purge_finished(&self, older_than: Duration) -> usize;
}
