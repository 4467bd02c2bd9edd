//! The shared counter store
//!
//! Rows are kept in a `DashMap` keyed by `CounterId`; each row carries the
//! quantity, the version token, and the timestamp of its last write. Plain
//! reads go straight to the map and never block. The conditional write is a
//! single atomic step against the live row: compare the version token, swap
//! the quantity, advance the token.

use crate::lock_table::LockTable;
use crate::transaction::Transaction;
use chrono::Utc;
use dashmap::DashMap;
use stockpile_core::{Counter, CounterId, Error, Result, Version};

/// A stored row: the mutable quantity plus store-managed bookkeeping.
#[derive(Debug, Clone)]
pub(crate) struct CounterRow {
    pub(crate) quantity: u64,
    pub(crate) version: Version,
    pub(crate) updated_at: i64,
}

impl CounterRow {
    pub(crate) fn new(quantity: u64) -> Self {
        CounterRow {
            quantity,
            version: 0,
            updated_at: Utc::now().timestamp(),
        }
    }
}

/// The shared, keyed counter store.
///
/// One instance stands in for the durable store all contending callers
/// coordinate through. Mutation happens either through a [`Transaction`]
/// (buffered writes applied at commit) or through [`write_if_version`]
/// (atomic conditional write, the optimistic strategy's commit point).
///
/// [`write_if_version`]: CounterStore::write_if_version
pub struct CounterStore {
    pub(crate) rows: DashMap<CounterId, CounterRow>,
    /// Exclusive row holds taken by `read_for_update`, held to transaction end
    pub(crate) row_holds: LockTable<CounterId>,
    /// Session-scoped named advisory holds, independent of row holds
    pub(crate) named_holds: LockTable<String>,
}

impl CounterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        CounterStore {
            rows: DashMap::new(),
            row_holds: LockTable::new(),
            named_holds: LockTable::new(),
        }
    }

    /// Seed a counter with an initial quantity.
    ///
    /// Upserts: re-seeding an existing id resets quantity and version, which
    /// is what test setups and re-provisioning want.
    pub fn create(&self, id: CounterId, quantity: u64) {
        self.rows.insert(id, CounterRow::new(quantity));
    }

    /// Plain read outside any transaction.
    pub fn get(&self, id: CounterId) -> Result<Counter> {
        self.rows
            .get(&id)
            .map(|row| Counter {
                id,
                quantity: row.quantity,
                version: row.version,
            })
            .ok_or(Error::NotFound(id))
    }

    /// Current quantity of a counter.
    pub fn quantity(&self, id: CounterId) -> Result<u64> {
        self.get(id).map(|c| c.quantity)
    }

    /// Current version token of a counter.
    pub fn version(&self, id: CounterId) -> Result<Version> {
        self.get(id).map(|c| c.version)
    }

    /// Begin a transaction.
    ///
    /// Transactions are values and never nest; every call yields an
    /// independent unit of work, so a caller that needs a fresh transaction
    /// while another is open simply begins a second one.
    pub fn begin(&self) -> Transaction<'_> {
        Transaction::new(self)
    }

    /// Conditional write: persist `new_quantity` only if the stored version
    /// token still equals `expected`.
    ///
    /// Atomic against the live row (the row's map entry is exclusively held
    /// for the compare-and-swap). On success the version token advances; on
    /// mismatch nothing is persisted and `Ok(false)` is returned.
    pub fn write_if_version(
        &self,
        id: CounterId,
        new_quantity: u64,
        expected: Version,
    ) -> Result<bool> {
        let mut row = self.rows.get_mut(&id).ok_or(Error::NotFound(id))?;
        if row.version != expected {
            return Ok(false);
        }
        row.quantity = new_quantity;
        row.version += 1;
        row.updated_at = Utc::now().timestamp();
        Ok(true)
    }

    /// Seconds-precision timestamp of the last committed write, if any.
    pub fn updated_at(&self, id: CounterId) -> Result<i64> {
        self.rows
            .get(&id)
            .map(|row| row.updated_at)
            .ok_or(Error::NotFound(id))
    }

    /// Number of counters in the store.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the store holds no counters.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Remove every counter. Test teardown helper.
    pub fn clear(&self) {
        self.rows.clear();
    }
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new()
    }
}
