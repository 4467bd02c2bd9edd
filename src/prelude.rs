//! Convenient imports for stockpile.
//!
//! Re-exports the types most callers need:
//!
//! ```
//! use stockpile::prelude::*;
//!
//! let db = Stockpile::new();
//! db.create(CounterId(1), 100);
//! ```

// Main entry point
pub use crate::database::{Stockpile, StockpileBuilder};

// Error handling
pub use crate::types::{Error, Result};

// Domain types
pub use crate::types::{Counter, CounterId, Version};

// Strategies
pub use crate::types::{
    AdvisoryDecrement, Decrement, MutexDecrement, OptimisticDecrement, PessimisticDecrement,
    RetryPolicy,
};
