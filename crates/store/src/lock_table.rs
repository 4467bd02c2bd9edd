//! Blocking lock table for row and named holds
//!
//! A set of held keys behind a `parking_lot::Mutex`, with a `Condvar` to
//! wake waiters on release. Used for both exclusive row holds (pessimistic
//! read-for-update) and session-scoped named advisory holds; the two uses
//! get separate table instances so they never interfere.

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashSet;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// A table of exclusively held keys.
///
/// `acquire` blocks until the key is free; `acquire_timeout` gives up after
/// a wait window, which is how named holds surface contention instead of
/// waiting forever.
pub struct LockTable<K: Eq + Hash + Clone> {
    held: Mutex<FxHashSet<K>>,
    released: Condvar,
}

impl<K: Eq + Hash + Clone> LockTable<K> {
    /// Create an empty lock table.
    pub fn new() -> Self {
        LockTable {
            held: Mutex::new(FxHashSet::default()),
            released: Condvar::new(),
        }
    }

    /// Block until `key` can be held, then hold it.
    pub fn acquire(&self, key: &K) {
        let mut held = self.held.lock();
        while held.contains(key) {
            self.released.wait(&mut held);
        }
        held.insert(key.clone());
    }

    /// Block until `key` can be held, up to `timeout`.
    ///
    /// Returns `false` if the wait window elapsed with the key still held.
    pub fn acquire_timeout(&self, key: &K, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut held = self.held.lock();
        while held.contains(key) {
            if self.released.wait_until(&mut held, deadline).timed_out() {
                return false;
            }
        }
        held.insert(key.clone());
        true
    }

    /// Release `key` and wake waiters.
    ///
    /// Releasing a key that is not held is a no-op.
    pub fn release(&self, key: &K) {
        let mut held = self.held.lock();
        if held.remove(key) {
            self.released.notify_all();
        }
    }

    /// Check whether `key` is currently held.
    pub fn is_held(&self, key: &K) -> bool {
        self.held.lock().contains(key)
    }
}

impl<K: Eq + Hash + Clone> Default for LockTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_acquire_and_release() {
        let table = LockTable::new();
        table.acquire(&1u64);
        assert!(table.is_held(&1));
        table.release(&1);
        assert!(!table.is_held(&1));
    }

    #[test]
    fn test_release_unheld_is_noop() {
        let table: LockTable<u64> = LockTable::new();
        table.release(&1);
        assert!(!table.is_held(&1));
    }

    #[test]
    fn test_acquire_timeout_on_held_key() {
        let table = LockTable::new();
        table.acquire(&1u64);
        assert!(!table.acquire_timeout(&1, Duration::from_millis(20)));
        // still held by the original owner
        assert!(table.is_held(&1));
    }

    #[test]
    fn test_acquire_blocks_until_released() {
        let table = Arc::new(LockTable::new());
        table.acquire(&1u64);

        let t2 = {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                table.acquire(&1u64);
                table.release(&1u64);
            })
        };

        thread::sleep(Duration::from_millis(20));
        table.release(&1u64);
        t2.join().unwrap();
        assert!(!table.is_held(&1));
    }

    #[test]
    fn test_distinct_keys_do_not_contend() {
        let table = LockTable::new();
        table.acquire(&1u64);
        assert!(table.acquire_timeout(&2u64, Duration::from_millis(5)));
        table.release(&1);
        table.release(&2);
    }
}
