//! Random source port
//!
//! All randomized control flow (delays, failure draws, status picks,
//! cascade node failures) draws from this port. Seeded adapters make
//! runs reproducible.

#[cfg(test)]
use mockall::automock;

/// Source of uniform random values
#[cfg_attr(test, automock)]
pub trait RandomPort: Send + Sync + std::fmt::Debug {
    /// Uniform draw in `[0, 1)`
    fn next_f64(&self) -> f64;

    /// Uniform draw in `[low, high]`
    ///
    /// Returns `low` when `high <= low`.
    fn range_inclusive(&self, low: u64, high: u64) -> u64;
}

/// Pick one element uniformly, `None` when empty
pub fn choose<'a, T>(random: &dyn RandomPort, items: &'a [T]) -> Option<&'a T> {
    let last = u64::try_from(items.len().checked_sub(1)?).ok()?;
    let index = usize::try_from(random.range_inclusive(0, last)).ok()?;
    items.get(index)
}
