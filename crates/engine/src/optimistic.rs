//! Optimistic strategy: version-checked write with retry
//!
//! Each attempt reads the counter together with its version token (no hold,
//! readers never block), validates sufficiency against that fresh read, and
//! issues a conditional write that succeeds only if the token is unchanged.
//! A lost race persists nothing; the loop sleeps the configured interval and
//! tries again with freshly read state. Insufficient quantity on a fresh
//! read is permanent and propagates immediately.
//!
//! Best under low contention: no blocking on the happy path, wasted work and
//! retry latency when writers collide.

use std::sync::Arc;
use stockpile_core::{CounterId, Error, Result};
use stockpile_store::CounterStore;
use tracing::{trace, warn};

use crate::{Decrement, RetryPolicy};

/// Decrement via conditional writes keyed on the version token.
pub struct OptimisticDecrement {
    store: Arc<CounterStore>,
    policy: RetryPolicy,
}

impl OptimisticDecrement {
    /// Create the strategy with the default retry policy (50 ms interval).
    pub fn new(store: Arc<CounterStore>) -> Self {
        Self::with_policy(store, RetryPolicy::optimistic_default())
    }

    /// Create the strategy with an explicit retry policy.
    pub fn with_policy(store: Arc<CounterStore>, policy: RetryPolicy) -> Self {
        OptimisticDecrement { store, policy }
    }

    /// One read-validate-conditional-write attempt.
    fn attempt(&self, id: CounterId, amount: u64) -> Result<()> {
        let txn = self.store.begin();
        let mut counter = txn.read_with_version(id)?;
        counter.decrease(amount)?;
        let expected = counter.version;
        if self.store.write_if_version(id, counter.quantity, expected)? {
            Ok(())
        } else {
            Err(Error::VersionConflict { id })
        }
    }
}

impl Decrement for OptimisticDecrement {
    fn decrease(&self, id: CounterId, amount: u64) -> Result<()> {
        for attempt in 1..=self.policy.max_attempts {
            match self.attempt(id, amount) {
                Err(e) if e.is_retryable() => {
                    trace!(%id, attempt, "version conflict, retrying");
                    self.policy.pause();
                }
                outcome => return outcome,
            }
        }
        warn!(%id, attempts = self.policy.max_attempts, "optimistic retries exhausted");
        Err(Error::RetriesExhausted {
            attempts: self.policy.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn seeded_store(quantity: u64) -> Arc<CounterStore> {
        let store = Arc::new(CounterStore::new());
        store.create(CounterId(1), quantity);
        store
    }

    #[test]
    fn test_single_decrement() {
        let store = seeded_store(100);
        let strategy = OptimisticDecrement::new(Arc::clone(&store));
        strategy.decrease(CounterId(1), 1).unwrap();
        assert_eq!(store.quantity(CounterId(1)).unwrap(), 99);
        assert_eq!(store.version(CounterId(1)).unwrap(), 1);
    }

    #[test]
    fn test_insufficient_propagates_without_retry() {
        let store = seeded_store(5);
        // interval long enough that a retry would be obvious in test time
        let strategy = OptimisticDecrement::with_policy(
            Arc::clone(&store),
            RetryPolicy::new(100, Duration::from_secs(5)),
        );
        let started = std::time::Instant::now();
        let err = strategy.decrease(CounterId(1), 6).unwrap_err();
        assert!(err.is_insufficient());
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(store.quantity(CounterId(1)).unwrap(), 5);
        assert_eq!(store.version(CounterId(1)).unwrap(), 0);
    }

    #[test]
    fn test_conflict_is_retried_with_fresh_read() {
        let store = seeded_store(100);
        let strategy = OptimisticDecrement::with_policy(
            Arc::clone(&store),
            RetryPolicy::new(50, Duration::from_millis(1)),
        );

        // another writer commits first; the strategy must observe the new
        // state on retry rather than reusing its stale read
        let contending: Vec<_> = (0..4)
            .map(|_| {
                let strategy = OptimisticDecrement::with_policy(
                    Arc::clone(&store),
                    RetryPolicy::new(50, Duration::from_millis(1)),
                );
                std::thread::spawn(move || strategy.decrease(CounterId(1), 1))
            })
            .collect();
        strategy.decrease(CounterId(1), 1).unwrap();
        for handle in contending {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(store.quantity(CounterId(1)).unwrap(), 95);
        assert_eq!(store.version(CounterId(1)).unwrap(), 5);
    }

    #[test]
    fn test_exhaustion_surfaces_bounded_error() {
        let store = seeded_store(100);
        let strategy = OptimisticDecrement::with_policy(
            Arc::clone(&store),
            RetryPolicy::new(3, Duration::from_millis(1)),
        );

        // a bumper thread keeps the version token moving so every
        // conditional write loses
        let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let bumper = {
            let store = Arc::clone(&store);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                while !stop.load(std::sync::atomic::Ordering::Relaxed) {
                    let version = store.version(CounterId(1)).unwrap();
                    let quantity = store.quantity(CounterId(1)).unwrap();
                    let _ = store.write_if_version(CounterId(1), quantity, version);
                }
            })
        };

        let outcome = strategy.decrease(CounterId(1), 1);
        stop.store(true, std::sync::atomic::Ordering::Relaxed);
        bumper.join().unwrap();

        match outcome {
            // under relentless version churn the bound must trip
            Err(Error::RetriesExhausted { attempts }) => assert_eq!(attempts, 3),
            // a lucky interleaving may still win a slot; that is also correct
            Ok(()) => assert_eq!(store.quantity(CounterId(1)).unwrap(), 99),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
