//! Distributed-mutex strategy: external coordinator claim
//!
//! For callers that may be separate processes with no shared transaction
//! domain. Before touching the counter, the caller claims a lock key derived
//! from the counter id at the external coordinator: a non-blocking
//! try-acquire, retried on a fixed short interval (spin-wait, not a queued
//! wait) until granted or the attempt bound trips. Once held, the decrement
//! is a plain read-modify-write in its own transaction, exactly as in a
//! single-writer scenario.
//!
//! The claim is released by a guard on every exit path; a stuck claim would
//! starve all other callers until the TTL expires. Release is token-checked,
//! so a caller whose claim expired and was reassigned can never release the
//! new owner's lock. An unreachable coordinator is fatal immediately, never
//! absorbed by the spin.

use std::sync::Arc;
use std::time::{Duration, Instant};
use stockpile_core::{CounterId, Error, LockCoordinator, Result};
use stockpile_store::CounterStore;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::{Decrement, RetryPolicy};

/// Default validity window for a coordinator claim.
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_secs(3);

/// A held coordinator claim, released on drop.
///
/// Owned exclusively by the acquiring caller; never shared, never nested.
struct HeldLock<'a, C: LockCoordinator> {
    coordinator: &'a C,
    key: String,
    token: Uuid,
    acquired_at: Instant,
}

impl<'a, C: LockCoordinator> HeldLock<'a, C> {
    fn new(coordinator: &'a C, key: String, token: Uuid) -> Self {
        HeldLock {
            coordinator,
            key,
            token,
            acquired_at: Instant::now(),
        }
    }
}

impl<C: LockCoordinator> Drop for HeldLock<'_, C> {
    fn drop(&mut self) {
        match self.coordinator.release(&self.key, self.token) {
            Ok(true) => {
                trace!(key = %self.key, held_for = ?self.acquired_at.elapsed(), "lock released")
            }
            Ok(false) => warn!(key = %self.key, "claim expired before release"),
            Err(e) => warn!(key = %self.key, error = %e, "coordinator unreachable during release"),
        }
    }
}

/// Decrement under an externally coordinated exclusive claim.
pub struct MutexDecrement<C: LockCoordinator> {
    store: Arc<CounterStore>,
    coordinator: Arc<C>,
    policy: RetryPolicy,
    ttl: Duration,
}

impl<C: LockCoordinator> MutexDecrement<C> {
    /// Create the strategy with the default spin policy and claim TTL.
    pub fn new(store: Arc<CounterStore>, coordinator: Arc<C>) -> Self {
        Self::with_policy(store, coordinator, RetryPolicy::spin_default(), DEFAULT_LOCK_TTL)
    }

    /// Create the strategy with an explicit spin policy and claim TTL.
    pub fn with_policy(
        store: Arc<CounterStore>,
        coordinator: Arc<C>,
        policy: RetryPolicy,
        ttl: Duration,
    ) -> Self {
        MutexDecrement {
            store,
            coordinator,
            policy,
            ttl,
        }
    }

    /// Spin until the claim is granted or the bound trips.
    fn acquire(&self, key: &str, token: Uuid) -> Result<()> {
        for attempt in 1..=self.policy.max_attempts {
            if self.coordinator.try_acquire(key, token, self.ttl)? {
                debug!(key, attempt, "lock acquired");
                return Ok(());
            }
            trace!(key, attempt, "lock busy, spinning");
            self.policy.pause();
        }
        warn!(key, attempts = self.policy.max_attempts, "spin-wait exhausted");
        Err(Error::RetriesExhausted {
            attempts: self.policy.max_attempts,
        })
    }

    /// Plain read-modify-write; mutual exclusion is already guaranteed.
    fn apply(&self, id: CounterId, amount: u64) -> Result<()> {
        let mut txn = self.store.begin();
        let mut counter = txn.read(id)?;
        counter.decrease(amount)?;
        txn.write(counter);
        txn.commit()
    }
}

impl<C: LockCoordinator> Decrement for MutexDecrement<C> {
    fn decrease(&self, id: CounterId, amount: u64) -> Result<()> {
        let key = id.lock_key();
        let token = Uuid::new_v4();
        self.acquire(&key, token)?;
        let _held = HeldLock::new(self.coordinator.as_ref(), key, token);
        // the guard releases on success, on InsufficientQuantity, and on
        // any unexpected failure below
        self.apply(id, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpile_coordinator::InMemoryCoordinator;
    use stockpile_core::CoordinatorError;

    fn seeded(quantity: u64) -> (Arc<CounterStore>, Arc<InMemoryCoordinator>) {
        let store = Arc::new(CounterStore::new());
        store.create(CounterId(1), quantity);
        (store, Arc::new(InMemoryCoordinator::new()))
    }

    #[test]
    fn test_single_decrement() {
        let (store, coordinator) = seeded(100);
        let strategy = MutexDecrement::new(Arc::clone(&store), coordinator);
        strategy.decrease(CounterId(1), 1).unwrap();
        assert_eq!(store.quantity(CounterId(1)).unwrap(), 99);
    }

    #[test]
    fn test_lock_released_after_success_and_failure() {
        let (store, coordinator) = seeded(1);
        let strategy = MutexDecrement::new(Arc::clone(&store), Arc::clone(&coordinator));

        strategy.decrease(CounterId(1), 1).unwrap();
        assert_eq!(coordinator.holder("counter:1"), None);

        let err = strategy.decrease(CounterId(1), 1).unwrap_err();
        assert!(err.is_insufficient());
        // released on the error path too, otherwise every later caller
        // would starve until the TTL
        assert_eq!(coordinator.holder("counter:1"), None);
    }

    #[test]
    fn test_spin_waits_out_a_held_lock() {
        let (store, coordinator) = seeded(100);
        let holder = Uuid::new_v4();
        coordinator
            .try_acquire("counter:1", holder, Duration::from_secs(3))
            .unwrap();

        let strategy = MutexDecrement::with_policy(
            Arc::clone(&store),
            Arc::clone(&coordinator),
            RetryPolicy::new(200, Duration::from_millis(5)),
            DEFAULT_LOCK_TTL,
        );

        let releaser = {
            let coordinator = Arc::clone(&coordinator);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(30));
                coordinator.release("counter:1", holder).unwrap();
            })
        };

        strategy.decrease(CounterId(1), 1).unwrap();
        releaser.join().unwrap();
        assert_eq!(store.quantity(CounterId(1)).unwrap(), 99);
    }

    #[test]
    fn test_spin_bound_trips_on_sustained_contention() {
        let (store, coordinator) = seeded(100);
        coordinator
            .try_acquire("counter:1", Uuid::new_v4(), Duration::from_secs(60))
            .unwrap();

        let strategy = MutexDecrement::with_policy(
            Arc::clone(&store),
            Arc::clone(&coordinator),
            RetryPolicy::new(3, Duration::from_millis(1)),
            DEFAULT_LOCK_TTL,
        );
        let err = strategy.decrease(CounterId(1), 1).unwrap_err();
        assert!(matches!(err, Error::RetriesExhausted { attempts: 3 }));
        assert_eq!(store.quantity(CounterId(1)).unwrap(), 100);
    }

    #[test]
    fn test_crashed_holder_does_not_deadlock_past_ttl() {
        let (store, coordinator) = seeded(100);
        // crashed mid-critical-section: claim never released, short TTL
        coordinator
            .try_acquire("counter:1", Uuid::new_v4(), Duration::from_millis(20))
            .unwrap();

        let strategy = MutexDecrement::with_policy(
            Arc::clone(&store),
            Arc::clone(&coordinator),
            RetryPolicy::new(200, Duration::from_millis(5)),
            DEFAULT_LOCK_TTL,
        );
        strategy.decrease(CounterId(1), 1).unwrap();
        assert_eq!(store.quantity(CounterId(1)).unwrap(), 99);
    }

    struct UnreachableCoordinator;

    impl LockCoordinator for UnreachableCoordinator {
        fn try_acquire(
            &self,
            _key: &str,
            _token: Uuid,
            _ttl: Duration,
        ) -> std::result::Result<bool, CoordinatorError> {
            Err(CoordinatorError("connection refused".to_string()))
        }

        fn release(
            &self,
            _key: &str,
            _token: Uuid,
        ) -> std::result::Result<bool, CoordinatorError> {
            Err(CoordinatorError("connection refused".to_string()))
        }
    }

    #[test]
    fn test_unreachable_coordinator_is_fatal_not_retried() {
        let store = Arc::new(CounterStore::new());
        store.create(CounterId(1), 100);
        let strategy = MutexDecrement::with_policy(
            Arc::clone(&store),
            Arc::new(UnreachableCoordinator),
            RetryPolicy::new(100, Duration::from_secs(5)),
            DEFAULT_LOCK_TTL,
        );

        let started = Instant::now();
        let err = strategy.decrease(CounterId(1), 1).unwrap_err();
        assert!(matches!(err, Error::CoordinatorUnavailable(_)));
        // fatal on the first attempt, no spinning against a dead service
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(store.quantity(CounterId(1)).unwrap(), 100);
    }
}
