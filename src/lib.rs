//! # Stockpile
//!
//! Safe concurrent decrement of shared, persisted inventory counters.
//!
//! Many simultaneous callers decrement the same counter; stockpile
//! guarantees that N concurrent decrements leave the counter at exactly the
//! initial value minus the sum of the successful amounts, with no decrement
//! lost, none applied twice, and the quantity never committed below zero.
//!
//! Four interchangeable strategies solve this with different tradeoffs:
//!
//! | Strategy | Mechanism | Best for |
//! |----------|-----------|----------|
//! | pessimistic | exclusive row hold, callers queue | high contention, shared store |
//! | optimistic | version-checked write + retry | low contention, no blocking |
//! | mutex | external coordinator claim, spin-wait | separate processes |
//! | advisory | session-scoped named hold | stores with cheap advisory locks |
//!
//! ## Quick Start
//!
//! ```
//! use stockpile::prelude::*;
//!
//! let db = Stockpile::new();
//! db.create(CounterId(1), 100);
//!
//! let decrementer = db.pessimistic();
//! decrementer.decrease(CounterId(1), 1)?;
//!
//! assert_eq!(db.quantity(CounterId(1))?, 99);
//! # stockpile::Result::Ok(())
//! ```

#![warn(missing_docs)]

mod database;
mod types;

pub mod prelude;

// Re-export main entry points
pub use database::{Stockpile, StockpileBuilder};

// Re-export types
pub use types::*;
