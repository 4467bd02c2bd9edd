//! Pessimistic strategy: exclusive row hold
//!
//! Opens a transaction, takes the row hold via read-for-update, applies the
//! business rule, writes, commits. Contention is resolved by blocking on the
//! hold, so there is no application-level retry; concurrent callers on the
//! same id are fully serialized by the store. Applicable only when every
//! contending caller shares the same store and transaction domain.

use std::sync::Arc;
use stockpile_core::{CounterId, Result};
use stockpile_store::CounterStore;
use tracing::debug;

use crate::Decrement;

/// Decrement under an exclusive row hold.
pub struct PessimisticDecrement {
    store: Arc<CounterStore>,
}

impl PessimisticDecrement {
    /// Create the strategy over a shared store.
    pub fn new(store: Arc<CounterStore>) -> Self {
        PessimisticDecrement { store }
    }
}

impl Decrement for PessimisticDecrement {
    fn decrease(&self, id: CounterId, amount: u64) -> Result<()> {
        let mut txn = self.store.begin();
        let mut counter = txn.read_for_update(id)?;
        // an error here drops the transaction, which rolls back and
        // releases the row hold
        counter.decrease(amount)?;
        txn.write(counter);
        txn.commit()?;
        debug!(%id, amount, "pessimistic decrement committed");
        Ok(())
    }
}
