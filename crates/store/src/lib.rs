//! Counter store for stockpile
//!
//! In-process stand-in for the durable counter store, exposing exactly the
//! primitives the decrement strategies consume:
//! - plain read / versioned read
//! - exclusive read-for-update (row hold until transaction end)
//! - unconditional buffered write inside a transaction
//! - atomic conditional write keyed on the version token
//! - session-scoped named advisory holds
//!
//! # Thread Safety
//!
//! Rows live in a `DashMap`, so plain reads never block. Row holds and named
//! holds are blocking claims in [`LockTable`]s, granted in wake-up order
//! rather than FIFO; fairness is not guaranteed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod lock_table;
pub mod store;
pub mod transaction;

pub use lock_table::LockTable;
pub use store::CounterStore;
pub use transaction::Transaction;
