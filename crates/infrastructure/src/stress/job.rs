//! Per-job shared state

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use domain::{StressExit, StressJobHandle, StressJobStatus};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::chaos::millis;

/// Flags and counters shared between a job's task and its observers
#[derive(Debug)]
pub(crate) struct JobControl {
    cancelled: AtomicBool,
    running: AtomicBool,
    achieved: AtomicU64,
    finished: Mutex<Option<(StressExit, Instant)>>,
}

impl JobControl {
    pub(crate) fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            running: AtomicBool::new(true),
            achieved: AtomicU64::new(0),
            finished: Mutex::new(None),
        }
    }

    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn set_achieved(&self, units: u64) {
        self.achieved.store(units, Ordering::Relaxed);
    }

    pub(crate) fn achieved(&self) -> u64 {
        self.achieved.load(Ordering::Relaxed)
    }

    /// Record how the job ended; only the first call sticks
    pub(crate) fn finish(&self, exit: StressExit) {
        let mut finished = self.finished.lock();
        if finished.is_none() {
            *finished = Some((exit, Instant::now()));
        }
    }

    pub(crate) fn finished(&self) -> Option<(StressExit, Instant)> {
        *self.finished.lock()
    }
}

/// Clears the running flag and wakes waiters when the job task ends
///
/// Dropped on every exit path of the job task, including unwinding.
#[derive(Debug)]
pub(crate) struct RunningGuard {
    control: Arc<JobControl>,
    done: watch::Sender<bool>,
}

impl RunningGuard {
    pub(crate) fn new(control: Arc<JobControl>, done: watch::Sender<bool>) -> Self {
        Self { control, done }
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        // Only sticks when the job task never reported an exit
        self.control.finish(StressExit::Failed);
        self.control.running.store(false, Ordering::Release);
        self.done.send_replace(true);
    }
}

/// A started job as tracked by the harness
#[derive(Debug)]
pub(crate) struct StressJob {
    pub(crate) handle: StressJobHandle,
    pub(crate) control: Arc<JobControl>,
    pub(crate) done: watch::Receiver<bool>,
}

impl StressJob {
    pub(crate) fn status(&self) -> StressJobStatus {
        let finished = self.control.finished();
        let end = finished.map_or_else(Instant::now, |(_, at)| at);
        StressJobStatus {
            job_id: self.handle.job_id,
            kind: self.handle.kind,
            intensity: self.handle.intensity,
            running: self.control.is_running(),
            elapsed_ms: millis(end.saturating_duration_since(self.handle.started_at)),
            achieved: self.control.achieved(),
            exit: finished.map(|(exit, _)| exit),
        }
    }

    /// Whether the job finished at least `older_than` ago
    pub(crate) fn finished_before(&self, now: Instant, older_than: Duration) -> bool {
        !self.control.is_running()
            && self
                .control
                .finished()
                .is_some_and(|(_, at)| now.saturating_duration_since(at) >= older_than)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_exit_sticks() {
        let control = JobControl::new();
        control.finish(StressExit::TimedOut);
        control.finish(StressExit::Completed);
        assert_eq!(control.finished().map(|(e, _)| e), Some(StressExit::TimedOut));
    }

    #[test]
    fn guard_without_exit_reports_failed() {
        let control = Arc::new(JobControl::new());
        let (tx, rx) = watch::channel(false);
        assert!(control.is_running());

        drop(RunningGuard::new(Arc::clone(&control), tx));

        assert!(!control.is_running());
        assert!(*rx.borrow());
        assert_eq!(control.finished().map(|(e, _)| e), Some(StressExit::Failed));
    }

    #[test]
    fn guard_runs_on_panic() {
        let control = Arc::new(JobControl::new());
        let (tx, _rx) = watch::channel(false);
        let guard = RunningGuard::new(Arc::clone(&control), tx);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = guard;
            panic!("workload blew up");
        }));

        assert!(result.is_err());
        assert!(!control.is_running());
        assert_eq!(control.finished().map(|(e, _)| e), Some(StressExit::Failed));
    }

    #[test]
    fn reported_exit_wins_over_guard() {
        let control = Arc::new(JobControl::new());
        let (tx, _rx) = watch::channel(false);
        let guard = RunningGuard::new(Arc::clone(&control), tx);

        control.finish(StressExit::Cancelled);
        drop(guard);

        assert_eq!(control.finished().map(|(e, _)| e), Some(StressExit::Cancelled));
    }
}
