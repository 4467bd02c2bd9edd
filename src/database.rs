//! Main entry point for stockpile.
//!
//! This module provides the `Stockpile` struct, which owns the shared
//! counter store and lock coordinator and hands out ready-to-use decrement
//! strategies over them.

use crate::types::{
    AdvisoryDecrement, Counter, CounterId, CounterStore, InMemoryCoordinator, MutexDecrement,
    OptimisticDecrement, PessimisticDecrement, Result, RetryPolicy,
};
use std::sync::Arc;
use std::time::Duration;

/// The stockpile database.
///
/// Owns the counter store and the lock coordinator all strategies
/// coordinate through. Strategy accessors return independent values over
/// the same shared state, so different callers can use different strategies
/// against their own counters concurrently.
///
/// # Example
///
/// ```
/// use stockpile::prelude::*;
///
/// let db = Stockpile::new();
/// db.create(CounterId(1), 100);
/// db.optimistic().decrease(CounterId(1), 1)?;
/// assert_eq!(db.quantity(CounterId(1))?, 99);
/// # stockpile::Result::Ok(())
/// ```
pub struct Stockpile {
    store: Arc<CounterStore>,
    coordinator: Arc<InMemoryCoordinator>,
    optimistic_retry: RetryPolicy,
    spin_retry: RetryPolicy,
    lock_ttl: Duration,
    named_lock_timeout: Duration,
}

impl Stockpile {
    /// Create a database with default policies.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building a database with custom policies.
    pub fn builder() -> StockpileBuilder {
        StockpileBuilder::default()
    }

    /// Seed a counter with an initial quantity.
    pub fn create(&self, id: CounterId, quantity: u64) {
        self.store.create(id, quantity);
    }

    /// Current quantity of a counter.
    pub fn quantity(&self, id: CounterId) -> Result<u64> {
        self.store.quantity(id)
    }

    /// Current state of a counter, version token included.
    pub fn counter(&self, id: CounterId) -> Result<Counter> {
        self.store.get(id)
    }

    /// The pessimistic strategy: exclusive row hold, callers queue.
    pub fn pessimistic(&self) -> PessimisticDecrement {
        PessimisticDecrement::new(Arc::clone(&self.store))
    }

    /// The optimistic strategy: version-checked write with retry.
    pub fn optimistic(&self) -> OptimisticDecrement {
        OptimisticDecrement::with_policy(Arc::clone(&self.store), self.optimistic_retry)
    }

    /// The distributed-mutex strategy: coordinator claim with spin-wait.
    pub fn mutex(&self) -> MutexDecrement<InMemoryCoordinator> {
        MutexDecrement::with_policy(
            Arc::clone(&self.store),
            Arc::clone(&self.coordinator),
            self.spin_retry,
            self.lock_ttl,
        )
    }

    /// The named-advisory-lock strategy: session-scoped hold.
    pub fn advisory(&self) -> AdvisoryDecrement {
        AdvisoryDecrement::with_timeout(Arc::clone(&self.store), self.named_lock_timeout)
    }

    /// The shared counter store.
    pub fn store(&self) -> &Arc<CounterStore> {
        &self.store
    }

    /// The shared lock coordinator.
    pub fn coordinator(&self) -> &Arc<InMemoryCoordinator> {
        &self.coordinator
    }
}

impl Default for Stockpile {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Stockpile`] with custom retry and lock policies.
pub struct StockpileBuilder {
    optimistic_retry: RetryPolicy,
    spin_retry: RetryPolicy,
    lock_ttl: Duration,
    named_lock_timeout: Duration,
}

impl Default for StockpileBuilder {
    fn default() -> Self {
        StockpileBuilder {
            optimistic_retry: RetryPolicy::optimistic_default(),
            spin_retry: RetryPolicy::spin_default(),
            lock_ttl: stockpile_engine::mutex::DEFAULT_LOCK_TTL,
            named_lock_timeout: stockpile_engine::advisory::DEFAULT_NAMED_LOCK_TIMEOUT,
        }
    }
}

impl StockpileBuilder {
    /// Retry policy for the optimistic strategy.
    pub fn optimistic_retry(mut self, policy: RetryPolicy) -> Self {
        self.optimistic_retry = policy;
        self
    }

    /// Spin-wait policy for the distributed-mutex strategy.
    pub fn spin_retry(mut self, policy: RetryPolicy) -> Self {
        self.spin_retry = policy;
        self
    }

    /// Validity window for coordinator claims.
    pub fn lock_ttl(mut self, ttl: Duration) -> Self {
        self.lock_ttl = ttl;
        self
    }

    /// Wait window for named advisory holds.
    pub fn named_lock_timeout(mut self, timeout: Duration) -> Self {
        self.named_lock_timeout = timeout;
        self
    }

    /// Build the database.
    pub fn build(self) -> Stockpile {
        Stockpile {
            store: Arc::new(CounterStore::new()),
            coordinator: Arc::new(InMemoryCoordinator::new()),
            optimistic_retry: self.optimistic_retry,
            spin_retry: self.spin_retry,
            lock_ttl: self.lock_ttl,
            named_lock_timeout: self.named_lock_timeout,
        }
    }
}
