//! Resource-consuming workloads
//!
//! Every workload polls the job's cancel flag at least every
//! [`CANCEL_POLL_INTERVAL`] and releases what it holds when it returns.

use std::{fmt, hint::black_box, sync::Arc, time::Duration};

use tokio::{
    sync::{OwnedSemaphorePermit, Semaphore},
    time::Instant,
};
use tracing::debug;

use super::job::JobControl;

/// Upper bound between two cancel-flag checks
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Length of one cpu duty-cycle slice
pub const CPU_SLICE: Duration = Duration::from_millis(20);

const MIB: usize = 1024 * 1024;
const SPIN_BATCH: u32 = 256;

/// Sleep until `deadline` or cancellation, whichever comes first
pub(crate) async fn hold_until(deadline: Instant, control: &JobControl) {
    while !control.is_cancelled() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        tokio::time::sleep((deadline - now).min(CANCEL_POLL_INTERVAL)).await;
    }
}

/// Spin for `intensity` percent of every slice until `deadline`
///
/// Blocking; run it on the blocking pool. Achievement is the number of
/// arithmetic operations performed.
pub(crate) fn burn_cpu(intensity: u32, deadline: std::time::Instant, control: &JobControl) {
    let busy = CPU_SLICE * intensity.min(100) / 100;
    let mut operations: u64 = 0;
    let mut acc: u64 = 0x9E37_79B9_7F4A_7C15;

    while !control.is_cancelled() {
        let slice_start = std::time::Instant::now();
        if slice_start >= deadline {
            break;
        }
        let slice_end = (slice_start + CPU_SLICE).min(deadline);
        let busy_end = (slice_start + busy).min(slice_end);

        while std::time::Instant::now() < busy_end {
            for _ in 0..SPIN_BATCH {
                acc = black_box(acc.rotate_left(5) ^ operations).wrapping_mul(31);
                operations += 1;
            }
        }
        control.set_achieved(operations);

        let now = std::time::Instant::now();
        if now < slice_end {
            std::thread::sleep(slice_end - now);
        }
    }

    black_box(acc);
}

/// One MiB of touched heap, paid for with a budget permit
pub(crate) struct MemoryChunk {
    buf: Vec<u8>,
    _permit: OwnedSemaphorePermit,
}

impl MemoryChunk {
    /// Allocate and touch one MiB, `None` when the allocator refuses
    fn allocate(permit: OwnedSemaphorePermit) -> Option<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(MIB).ok()?;
        buf.resize(MIB, 0xA5);
        Some(Self {
            buf,
            _permit: permit,
        })
    }
}

impl fmt::Debug for MemoryChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryChunk")
            .field("bytes", &self.buf.len())
            .finish_non_exhaustive()
    }
}

/// Hold up to `mib` MiB until `deadline` or cancellation
///
/// Allocation stops early when the shared budget or the allocator runs
/// short; the job then holds what it got.
pub(crate) async fn hold_memory(
    mib: u32,
    deadline: Instant,
    budget: Arc<Semaphore>,
    control: &JobControl,
) {
    let mut chunks = Vec::with_capacity(mib as usize);
    while chunks.len() < mib as usize && !control.is_cancelled() {
        let Ok(permit) = Arc::clone(&budget).try_acquire_owned() else {
            break;
        };
        let Some(chunk) = MemoryChunk::allocate(permit) else {
            break;
        };
        chunks.push(chunk);
        control.set_achieved(chunks.len() as u64);
        tokio::task::yield_now().await;
    }

    if chunks.len() < mib as usize {
        debug!(
            requested_mib = mib,
            held_mib = chunks.len(),
            "Memory stress running with partial allocation"
        );
    }

    hold_until(deadline, control).await;
}

/// A pretend open connection occupying one pool slot
#[derive(Debug)]
pub(crate) struct SimulatedConnection {
    id: u32,
    opened_at: Instant,
    _permit: OwnedSemaphorePermit,
}

impl SimulatedConnection {
    fn open(id: u32, pool: &Arc<Semaphore>) -> Option<Self> {
        let permit = Arc::clone(pool).try_acquire_owned().ok()?;
        Some(Self {
            id,
            opened_at: Instant::now(),
            _permit: permit,
        })
    }
}

impl Drop for SimulatedConnection {
    fn drop(&mut self) {
        debug!(
            connection = self.id,
            held_ms = crate::chaos::millis(self.opened_at.elapsed()),
            "Simulated connection closed"
        );
    }
}

/// Hold up to `count` simulated connections until `deadline` or cancellation
pub(crate) async fn hold_connections(
    count: u32,
    deadline: Instant,
    pool: Arc<Semaphore>,
    control: &JobControl,
) {
    let mut connections = Vec::with_capacity(count as usize);
    for id in 0..count {
        if control.is_cancelled() {
            break;
        }
        let Some(connection) = SimulatedConnection::open(id, &pool) else {
            debug!(
                requested = count,
                opened = connections.len(),
                "Connection pool exhausted"
            );
            break;
        };
        connections.push(connection);
        control.set_achieved(connections.len() as u64);
    }

    hold_until(deadline, control).await;
}
