//! Randomized conservation workload.
//!
//! Callers decrement by random amounts; whatever interleaving happens, the
//! final quantity must equal the initial quantity minus the sum of the
//! amounts that succeeded, and every failure must be the insufficient
//! outcome (never a lost or doubled update).

use rand::Rng;
use std::sync::{Arc, Barrier};
use std::thread;
use stockpile::prelude::*;
use stockpile::CounterStore;

const ID: CounterId = CounterId(1);

#[test]
fn conservation_pessimistic() {
    let db = Stockpile::new();
    db.create(ID, 500);
    let strategy = db.pessimistic();
    let store = Arc::clone(db.store());
    conservation_check(strategy, store, 500);
}

#[test]
fn conservation_optimistic() {
    let db = Stockpile::builder()
        .optimistic_retry(RetryPolicy::new(10_000, std::time::Duration::from_millis(1)))
        .build();
    db.create(ID, 500);
    let strategy = db.optimistic();
    let store = Arc::clone(db.store());
    conservation_check(strategy, store, 500);
}

#[test]
fn conservation_mutex() {
    let db = Stockpile::builder()
        .spin_retry(RetryPolicy::new(10_000, std::time::Duration::from_millis(1)))
        .build();
    db.create(ID, 500);
    let strategy = db.mutex();
    let store = Arc::clone(db.store());
    conservation_check(strategy, store, 500);
}

fn conservation_check<S>(strategy: S, store: Arc<CounterStore>, initial: u64)
where
    S: Decrement + Send + Sync + 'static,
{
    let strategy = Arc::new(strategy);
    let callers = 16;
    let barrier = Arc::new(Barrier::new(callers));

    let handles: Vec<_> = (0..callers)
        .map(|_| {
            let strategy = Arc::clone(&strategy);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                let mut removed = 0u64;
                barrier.wait();
                for _ in 0..20 {
                    let amount = rng.gen_range(1..=3);
                    match strategy.decrease(ID, amount) {
                        Ok(()) => removed += amount,
                        Err(e) => assert!(e.is_insufficient(), "unexpected error: {e}"),
                    }
                }
                removed
            })
        })
        .collect();

    let removed_total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(store.quantity(ID).unwrap(), initial - removed_total);
}
