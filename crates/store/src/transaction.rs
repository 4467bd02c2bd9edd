//! Transaction boundary over the counter store
//!
//! A transaction buffers unconditional writes and tracks the holds it has
//! taken. Commit applies the buffered writes (advancing each row's version
//! token) and releases every hold; rollback discards the buffer and releases
//! the holds. Dropping an unfinished transaction rolls it back, so holds can
//! never leak past an error path.

use chrono::Utc;
use rustc_hash::FxHashMap;
use stockpile_core::{Counter, CounterId, Error, Result};
use tracing::trace;

use crate::store::{CounterRow, CounterStore};

/// An atomic unit of work over the [`CounterStore`].
///
/// Transactions never nest: each one is an independent scope, and a caller
/// holding one open may begin another whose commit is durable regardless of
/// the first one's fate. That is exactly what the named-advisory-lock
/// strategy relies on for its inner decrement.
pub struct Transaction<'a> {
    store: &'a CounterStore,
    writes: FxHashMap<CounterId, Counter>,
    row_holds: Vec<CounterId>,
    named_holds: Vec<String>,
    finished: bool,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(store: &'a CounterStore) -> Self {
        Transaction {
            store,
            writes: FxHashMap::default(),
            row_holds: Vec::new(),
            named_holds: Vec::new(),
            finished: false,
        }
    }

    /// Plain read, no hold taken. Sees this transaction's buffered writes.
    pub fn read(&self, id: CounterId) -> Result<Counter> {
        if let Some(pending) = self.writes.get(&id) {
            return Ok(pending.clone());
        }
        self.store.get(id)
    }

    /// Read with the current version token exposed.
    ///
    /// Identical data to [`read`](Self::read); named separately because the
    /// optimistic strategy's contract is a versioned read with no hold.
    pub fn read_with_version(&self, id: CounterId) -> Result<Counter> {
        self.read(id)
    }

    /// Exclusive read-for-update.
    ///
    /// Blocks until the row hold is granted, then reads. The hold is kept
    /// until this transaction commits or rolls back, fully serializing other
    /// read-for-update callers on the same id.
    pub fn read_for_update(&mut self, id: CounterId) -> Result<Counter> {
        if !self.row_holds.contains(&id) {
            self.store.row_holds.acquire(&id);
            self.row_holds.push(id);
        }
        self.read(id)
    }

    /// Buffer an unconditional write, applied at commit.
    ///
    /// Used after mutual exclusion is already established (row hold, named
    /// hold, or coordinator claim); the commit advances the row's version
    /// token past whatever the buffered counter carried.
    pub fn write(&mut self, counter: Counter) {
        self.writes.insert(counter.id, counter);
    }

    /// Acquire a session-scoped named advisory hold.
    ///
    /// Blocks up to `timeout`; a window that elapses with the key still held
    /// surfaces as [`Error::LockContended`]. The hold is independent of row
    /// holds and is released explicitly or at transaction end.
    pub fn acquire_named(&mut self, key: &str, timeout: std::time::Duration) -> Result<()> {
        if self.named_holds.iter().any(|held| held == key) {
            return Ok(());
        }
        if !self.store.named_holds.acquire_timeout(&key.to_string(), timeout) {
            return Err(Error::LockContended {
                key: key.to_string(),
            });
        }
        self.named_holds.push(key.to_string());
        Ok(())
    }

    /// Release a named advisory hold taken by this transaction.
    pub fn release_named(&mut self, key: &str) {
        if let Some(pos) = self.named_holds.iter().position(|held| held == key) {
            self.named_holds.swap_remove(pos);
            self.store.named_holds.release(&key.to_string());
        }
    }

    /// Commit: apply buffered writes, advance version tokens, release holds.
    pub fn commit(mut self) -> Result<()> {
        let now = Utc::now().timestamp();
        for (id, counter) in self.writes.drain() {
            match self.store.rows.get_mut(&id) {
                Some(mut row) => {
                    row.quantity = counter.quantity;
                    row.version += 1;
                    row.updated_at = now;
                }
                None => {
                    self.store.rows.insert(id, CounterRow::new(counter.quantity));
                }
            }
        }
        self.finish();
        Ok(())
    }

    /// Roll back: discard buffered writes and release all holds.
    pub fn rollback(mut self) {
        self.writes.clear();
        self.finish();
    }

    fn finish(&mut self) {
        for id in self.row_holds.drain(..) {
            self.store.row_holds.release(&id);
        }
        for key in self.named_holds.drain(..) {
            self.store.named_holds.release(&key);
        }
        self.finished = true;
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            trace!("transaction dropped without commit, rolling back");
            self.writes.clear();
            self.finish();
        }
    }
}
