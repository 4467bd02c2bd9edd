//! Public types for the stockpile unified API.
//!
//! This module re-exports types from internal crates with a clean public
//! interface.

// Domain types and errors
pub use stockpile_core::{Counter, CounterId, Version};
pub use stockpile_core::{CoordinatorError, Error, Result};

// External-collaborator seams
pub use stockpile_core::LockCoordinator;
pub use stockpile_coordinator::InMemoryCoordinator;
pub use stockpile_store::{CounterStore, Transaction};

// Strategies and their shared contract
pub use stockpile_engine::{
    AdvisoryDecrement, Decrement, MutexDecrement, OptimisticDecrement, PessimisticDecrement,
    RetryPolicy,
};
