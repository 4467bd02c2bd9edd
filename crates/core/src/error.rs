//! Unified error types for stockpile.
//!
//! One taxonomy is shared by every layer. Transient kinds (`VersionConflict`,
//! `LockContended`) are absorbed inside the strategies that produce them and
//! only reach callers indirectly, as `RetriesExhausted`. Permanent kinds
//! (`InsufficientQuantity`, `CoordinatorUnavailable`) always propagate.

use crate::types::CounterId;
use thiserror::Error;

/// All stockpile errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The decrement would drive the counter below zero.
    ///
    /// Permanent business-rule violation: the counter is left unchanged and
    /// the call must not be retried with the same arguments.
    #[error("insufficient quantity on counter {id}: requested {requested}, available {available}")]
    InsufficientQuantity {
        /// Counter the decrement targeted
        id: CounterId,
        /// Amount the caller asked to remove
        requested: u64,
        /// Quantity available at the time of the check
        available: u64,
    },

    /// Decrement amount was zero.
    #[error("decrement amount must be positive")]
    InvalidAmount,

    /// No counter exists with the given id.
    #[error("counter not found: {0}")]
    NotFound(CounterId),

    /// A conditional write lost to a concurrent writer.
    ///
    /// Transient: the optimistic strategy retries on this internally.
    #[error("version conflict on counter {id}")]
    VersionConflict {
        /// Counter whose version token moved under us
        id: CounterId,
    },

    /// A named hold could not be granted within its wait window.
    ///
    /// Transient from the system's point of view, but surfaced once the
    /// configured wait is exceeded.
    #[error("lock contended: {key}")]
    LockContended {
        /// Resource key that stayed held
        key: String,
    },

    /// A bounded retry loop hit its attempt limit without succeeding.
    #[error("retries exhausted after {attempts} attempts")]
    RetriesExhausted {
        /// Number of attempts made before giving up
        attempts: u32,
    },

    /// The external lock coordinator could not be reached.
    ///
    /// Fatal: never absorbed by spin-wait, always reported to the caller.
    #[error("lock coordinator unavailable: {0}")]
    CoordinatorUnavailable(String),
}

/// Result type for stockpile operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is transient and may succeed on retry with
    /// fresh state.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::VersionConflict { .. } | Error::LockContended { .. }
        )
    }

    /// Check if this is the permanent insufficient-quantity outcome.
    pub fn is_insufficient(&self) -> bool {
        matches!(self, Error::InsufficientQuantity { .. })
    }
}

/// Failure to communicate with the external lock coordinator.
///
/// Distinct from `Error` so the coordinator contract can be implemented
/// without depending on the rest of the taxonomy; converted at the engine
/// boundary into [`Error::CoordinatorUnavailable`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CoordinatorError(pub String);

impl From<CoordinatorError> for Error {
    fn from(e: CoordinatorError) -> Self {
        Error::CoordinatorUnavailable(e.0)
    }
}
