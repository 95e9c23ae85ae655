//! Stress harness adapter

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use application::ports::StressHarnessPort;
use async_trait::async_trait;
use domain::{StressExit, StressJobHandle, StressJobId, StressJobStatus, StressKind, StressSpec};
use parking_lot::RwLock;
use tokio::sync::{Semaphore, watch};
use tracing::{info, warn};

use super::{
    job::{JobControl, RunningGuard, StressJob},
    workloads,
};

/// Extra time a job gets past its deadline before it is forcibly stopped
pub const SUPERVISOR_GRACE: Duration = Duration::from_secs(2);

/// Harness-wide resource ceilings shared by all jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressBudgets {
    /// MiB all memory jobs together may hold
    pub memory_mib: u32,
    /// Simulated connections all jobs together may hold
    pub connections: u32,
    /// CPU jobs allowed to spin at the same time
    pub cpu_jobs: u32,
}

impl Default for StressBudgets {
    fn default() -> Self {
        Self {
            memory_mib: 256,
            connections: 200,
            cpu_jobs: 4,
        }
    }
}

/// Shared pools handed to one supervised job
#[derive(Debug)]
struct Budgets {
    memory: Arc<Semaphore>,
    connections: Arc<Semaphore>,
    cpu_slots: Arc<Semaphore>,
}

/// Runs stress jobs as supervised background tasks
#[derive(Debug)]
pub struct StressHarness {
    jobs: RwLock<HashMap<StressJobId, Arc<StressJob>>>,
    memory_budget: Arc<Semaphore>,
    connection_pool: Arc<Semaphore>,
    cpu_slots: Arc<Semaphore>,
    budgets: StressBudgets,
}

impl StressHarness {
    /// Create a harness with the given budgets
    pub fn new(budgets: StressBudgets) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            memory_budget: Arc::new(Semaphore::new(budgets.memory_mib as usize)),
            connection_pool: Arc::new(Semaphore::new(budgets.connections as usize)),
            cpu_slots: Arc::new(Semaphore::new(budgets.cpu_jobs as usize)),
            budgets,
        }
    }

    /// Configured budgets
    pub const fn budgets(&self) -> StressBudgets {
        self.budgets
    }

    /// MiB not currently held by any job
    pub fn available_memory_mib(&self) -> usize {
        self.memory_budget.available_permits()
    }

    /// Pool slots not currently held by any job
    pub fn available_connections(&self) -> usize {
        self.connection_pool.available_permits()
    }

    /// CPU job slots not currently taken
    pub fn available_cpu_slots(&self) -> usize {
        self.cpu_slots.available_permits()
    }

    /// Number of tracked jobs, finished ones included
    pub fn job_count(&self) -> usize {
        self.jobs.read().len()
    }

    fn job(&self, job_id: StressJobId) -> Option<Arc<StressJob>> {
        self.jobs.read().get(&job_id).cloned()
    }

    async fn supervise(spec: StressSpec, control: Arc<JobControl>, budgets: Budgets) -> StressExit {
        let limit = spec.duration() + SUPERVISOR_GRACE;
        let deadline = tokio::time::Instant::now() + spec.duration();
        let intensity = spec.intensity();

        let completed = match spec.kind() {
            StressKind::Cpu => {
                let Ok(slot) = budgets.cpu_slots.try_acquire_owned() else {
                    warn!(intensity, "No CPU stress slot free, nothing achieved");
                    control.set_achieved(0);
                    return StressExit::Completed;
                };
                let worker = Arc::clone(&control);
                let mut task = tokio::task::spawn_blocking(move || {
                    let _slot = slot;
                    workloads::burn_cpu(intensity, deadline.into_std(), &worker);
                });
                let result = tokio::time::timeout(limit, &mut task).await;
                match result {
                    Ok(Ok(())) => true,
                    Ok(Err(e)) => {
                        warn!(error = %e, "CPU stress worker failed");
                        return StressExit::Failed;
                    },
                    Err(_) => {
                        control.cancel();
                        let _ = task.await;
                        false
                    },
                }
            },
            StressKind::Memory => tokio::time::timeout(
                limit,
                workloads::hold_memory(intensity, deadline, budgets.memory, &control),
            )
            .await
            .is_ok(),
            StressKind::Connections => tokio::time::timeout(
                limit,
                workloads::hold_connections(intensity, deadline, budgets.connections, &control),
            )
            .await
            .is_ok(),
        };

        if !completed {
            control.cancel();
            StressExit::TimedOut
        } else if control.is_cancelled() {
            StressExit::Cancelled
        } else {
            StressExit::Completed
        }
    }
}

impl Default for StressHarness {
    fn default() -> Self {
        Self::new(StressBudgets::default())
    }
}

#[async_trait]
impl StressHarnessPort for StressHarness {
    fn start(&self, spec: StressSpec) -> StressJobHandle {
        let handle = StressJobHandle::new(StressJobId::new(), &spec, Instant::now());
        let control = Arc::new(JobControl::new());
        let (done_tx, done_rx) = watch::channel(false);

        self.jobs.write().insert(
            handle.job_id,
            Arc::new(StressJob {
                handle,
                control: Arc::clone(&control),
                done: done_rx,
            }),
        );

        info!(
            job_id = %handle.job_id,
            kind = %spec.kind(),
            intensity = spec.intensity(),
            duration_ms = crate::chaos::millis(spec.duration()),
            "Stress job started"
        );

        let guard = RunningGuard::new(Arc::clone(&control), done_tx);
        let budgets = Budgets {
            memory: Arc::clone(&self.memory_budget),
            connections: Arc::clone(&self.connection_pool),
            cpu_slots: Arc::clone(&self.cpu_slots),
        };
        tokio::spawn(async move {
            let _guard = guard;
            let exit = Self::supervise(spec, Arc::clone(&control), budgets).await;
            control.finish(exit);
            info!(
                job_id = %handle.job_id,
                exit = %exit,
                achieved = control.achieved(),
                "Stress job finished"
            );
        });

        handle
    }

    fn cancel(&self, job_id: StressJobId) -> bool {
        let Some(job) = self.job(job_id) else {
            return false;
        };
        if job.control.is_running() {
            info!(job_id = %job_id, "Cancelling stress job");
            job.control.cancel();
        }
        true
    }

    fn status(&self, job_id: StressJobId) -> Option<StressJobStatus> {
        self.job(job_id).map(|job| job.status())
    }

    async fn wait(&self, job_id: StressJobId) -> Option<StressJobStatus> {
        let job = self.job(job_id)?;
        let mut done = job.done.clone();
        // A closed channel means the guard already ran.
        let _ = done.wait_for(|finished| *finished).await;
        Some(job.status())
    }

    fn purge_finished(&self, older_than: Duration) -> usize {
        let now = Instant::now();
        let mut jobs = self.jobs.write();
        let before = jobs.len();
        jobs.retain(|_, job| !job.finished_before(now, older_than));
        before - jobs.len()
    }
}
