//! Named-advisory-lock strategy: session-scoped hold, independent inner write
//!
//! The outer transaction does nothing but hold a named advisory lock keyed
//! by the counter id. Under that hold the decrement runs as a plain
//! read-validate-write in its own independent transaction, so its durable
//! effect is visible immediately and survives whatever happens to the outer
//! transaction afterwards. No row hold is taken; the named hold alone
//! provides mutual exclusion.
//!
//! Suits stores that can express advisory locks cheaply and want a
//! timeout-capable wait that row-level holds cannot offer.

use std::sync::Arc;
use std::time::Duration;
use stockpile_core::{CounterId, Result};
use stockpile_store::CounterStore;
use tracing::debug;

use crate::Decrement;

/// Default wait window for the named hold.
pub const DEFAULT_NAMED_LOCK_TIMEOUT: Duration = Duration::from_secs(3);

/// Decrement under a session-scoped named advisory hold.
pub struct AdvisoryDecrement {
    store: Arc<CounterStore>,
    lock_timeout: Duration,
}

impl AdvisoryDecrement {
    /// Create the strategy with the default wait window.
    pub fn new(store: Arc<CounterStore>) -> Self {
        Self::with_timeout(store, DEFAULT_NAMED_LOCK_TIMEOUT)
    }

    /// Create the strategy with an explicit wait window for the named hold.
    pub fn with_timeout(store: Arc<CounterStore>, lock_timeout: Duration) -> Self {
        AdvisoryDecrement {
            store,
            lock_timeout,
        }
    }

    /// The inner decrement, in its own independent transaction.
    fn apply_independent(&self, id: CounterId, amount: u64) -> Result<()> {
        let mut txn = self.store.begin();
        let mut counter = txn.read(id)?;
        counter.decrease(amount)?;
        txn.write(counter);
        txn.commit()
    }
}

impl Decrement for AdvisoryDecrement {
    fn decrease(&self, id: CounterId, amount: u64) -> Result<()> {
        let key = id.lock_key();
        let mut outer = self.store.begin();
        outer.acquire_named(&key, self.lock_timeout)?;
        // if the inner decrement fails or panics, dropping `outer` still
        // releases the named hold
        let outcome = self.apply_independent(id, amount);
        outer.release_named(&key);
        outer.commit()?;
        debug!(%id, amount, success = outcome.is_ok(), "advisory decrement finished");
        outcome
    }
}
