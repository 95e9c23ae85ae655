//! Random source adapters

use std::sync::Arc;

use application::ports::RandomPort;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Unseeded source using the thread-local generator
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomPort for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::rng().random::<f64>()
    }

    fn range_inclusive(&self, low: u64, high: u64) -> u64 {
        if high <= low {
            return low;
        }
        rand::rng().random_range(low..=high)
    }
}

/// Deterministic source for reproducible runs
///
/// Draws are serialized through a mutex, so the same seed and the same
/// call order always give the same sequence.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    inner: Arc<Mutex<StdRng>>,
    seed: u64,
}

impl SeededRandom {
    /// Create a source seeded with `seed`
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
            seed,
        }
    }

    /// Seed this source was created with
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomPort for SeededRandom {
    fn next_f64(&self) -> f64 {
        self.inner.lock().random::<f64>()
    }

    fn range_inclusive(&self, low: u64, high: u64) -> u64 {
        if high <= low {
            return low;
        }
        self.inner.lock().random_range(low..=high)
    }
}

/// Build a source from an optional seed
#[must_use]
pub fn random_source(seed: Option<u64>) -> Arc<dyn RandomPort> {
    match seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadRandom),
    }
}
