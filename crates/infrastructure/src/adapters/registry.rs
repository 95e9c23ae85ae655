//! Process-wide keyed state with per-key locking
//!
//! The map itself sits behind a read-write lock that is only held to look
//! up or insert an entry. Each entry has its own mutex, so work on one key
//! never blocks another.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::{Mutex, RwLock};

#[derive(Debug)]
struct Slot<T> {
    value: T,
    last_used: Instant,
    /// Set when the entry was removed from the map; holders must look it up again
    retired: bool,
}

#[derive(Debug)]
struct Entry<T> {
    slot: Mutex<Slot<T>>,
}

/// Map from string key to lazily created, individually locked state
#[derive(Debug)]
pub struct KeyedRegistry<T> {
    entries: RwLock<HashMap<String, Arc<Entry<T>>>>,
}

impl<T> Default for KeyedRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> KeyedRegistry<T> {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn entry_for(&self, key: &str, now: Instant, init: &impl Fn() -> T) -> Arc<Entry<T>> {
        if let Some(entry) = self.entries.read().get(key) {
            return Arc::clone(entry);
        }

        let mut entries = self.entries.write();
        let entry = entries.entry(key.to_string()).or_insert_with(|| {
            Arc::new(Entry {
                slot: Mutex::new(Slot {
                    value: init(),
                    last_used: now,
                    retired: false,
                }),
            })
        });
        Arc::clone(entry)
    }

    /// Run `f` on the state for `key` under that key's lock
    ///
    /// The state is created with `init` on first reference, and the key's
    /// idle timer is reset to `now`.
    pub fn with<R>(
        &self,
        key: &str,
        now: Instant,
        init: impl Fn() -> T,
        f: impl FnOnce(&mut T) -> R,
    ) -> R {
        loop {
            let entry = self.entry_for(key, now, &init);
            let mut slot = entry.slot.lock();
            if slot.retired {
                continue;
            }
            slot.last_used = now;
            return f(&mut slot.value);
        }
    }

    /// Read the state for `key` without creating it or touching its idle timer
    pub fn peek<R>(&self, key: &str, f: impl FnOnce(&T) -> R) -> Option<R> {
        let entry = self.entries.read().get(key).map(Arc::clone)?;
        let slot = entry.slot.lock();
        if slot.retired {
            return None;
        }
        Some(f(&slot.value))
    }

    /// Remove keys idle for at least `idle`, returning how many were removed
    ///
    /// Entries locked by a caller at the time of the sweep are kept.
    pub fn evict_idle(&self, now: Instant, idle: Duration) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| {
            let Some(mut slot) = entry.slot.try_lock() else {
                return true;
            };
            if now.saturating_duration_since(slot.last_used) < idle {
                return true;
            }
            slot.retired = true;
            false
        });
        before - entries.len()
    }

    /// Number of keys currently held
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no keys are held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn creates_lazily_and_reuses() {
        let registry = KeyedRegistry::<u32>::new();
        let now = Instant::now();
        assert!(registry.peek("a", |v| *v).is_none());

        registry.with("a", now, || 10, |v| *v += 1);
        registry.with("a", now, || 100, |v| *v += 1);

        assert_eq!(registry.peek("a", |v| *v), Some(12));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn keys_are_independent() {
        let registry = KeyedRegistry::<u32>::new();
        let now = Instant::now();
        registry.with("a", now, || 0, |v| *v = 1);
        registry.with("b", now, || 0, |v| *v = 2);
        assert_eq!(registry.peek("a", |v| *v), Some(1));
        assert_eq!(registry.peek("b", |v| *v), Some(2));
    }

    #[test]
    fn evicts_only_idle_keys() {
        let registry = KeyedRegistry::<u32>::new();
        let start = Instant::now();
        registry.with("old", start, || 0, |_| ());
        registry.with("fresh", start + Duration::from_secs(50), || 0, |_| ());

        let removed = registry.evict_idle(start + Duration::from_secs(60), Duration::from_secs(30));

        assert_eq!(removed, 1);
        assert!(registry.peek("old", |_| ()).is_none());
        assert!(registry.peek("fresh", |_| ()).is_some());
    }

    #[test]
    fn evicted_key_starts_fresh() {
        let registry = KeyedRegistry::<u32>::new();
        let start = Instant::now();
        registry.with("a", start, || 0, |v| *v = 5);
        registry.evict_idle(start + Duration::from_secs(10), Duration::from_secs(1));

        let value = registry.with("a", start + Duration::from_secs(10), || 0, |v| *v);
        assert_eq!(value, 0);
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let registry = Arc::new(KeyedRegistry::<u64>::new());
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        registry.with("shared", now, || 0, |v| *v += 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.peek("shared", |v| *v), Some(8000));
    }
}
