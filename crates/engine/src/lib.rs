//! Decrement engine for stockpile
//!
//! Four interchangeable strategies for safely decrementing a shared counter
//! under contention, each a self-contained policy for serializing access to
//! the same logical row:
//!
//! - [`PessimisticDecrement`]: exclusive row hold, callers queue on the
//!   store; simplest logic, throughput degrades under contention.
//! - [`OptimisticDecrement`]: version-checked conditional write with retry;
//!   readers never block, wasted work under contention.
//! - [`MutexDecrement`]: external coordinator claim with spin-wait; the only
//!   strategy usable when callers share no transaction domain.
//! - [`AdvisoryDecrement`]: session-scoped named hold around an independent
//!   inner transaction; suits stores with cheap advisory locks.
//!
//! All four share one contract, [`Decrement`], and the same postconditions:
//! exactly one durable write per successful call, none on failure, and the
//! counter never committed below zero.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod advisory;
pub mod mutex;
pub mod optimistic;
pub mod pessimistic;
pub mod retry;

pub use advisory::AdvisoryDecrement;
pub use mutex::MutexDecrement;
pub use optimistic::OptimisticDecrement;
pub use pessimistic::PessimisticDecrement;
pub use retry::RetryPolicy;

use stockpile_core::{CounterId, Result};

/// Common contract of the four strategies.
///
/// Success means the stored quantity dropped by exactly `amount` relative to
/// the state the decrement logically applied against, with no concurrent
/// decrement lost. `InsufficientQuantity` leaves the counter provably
/// unchanged. Calls are synchronous: each blocks its caller until success or
/// a final error.
pub trait Decrement {
    /// Decrease the counter `id` by `amount` (`amount > 0`).
    fn decrease(&self, id: CounterId, amount: u64) -> Result<()>;
}
