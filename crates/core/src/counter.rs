//! The Counter entity and its business rule
//!
//! A counter is created once with an initial quantity and is mutated only
//! through [`Counter::decrease`]. Quantity is `u64`, so the `quantity >= 0`
//! invariant holds by construction; underflow is rejected before any write.

use crate::error::{Error, Result};
use crate::types::{CounterId, Version};
use serde::{Deserialize, Serialize};

/// A persisted inventory counter.
///
/// `version` is the store-managed version token, advanced on every committed
/// write. Only the optimistic strategy inspects it; the other strategies
/// carry it through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    /// Stable identifier, immutable after creation
    pub id: CounterId,
    /// Current quantity; the only mutable business field
    pub quantity: u64,
    /// Version token as of the read that produced this value
    pub version: Version,
}

impl Counter {
    /// Create a counter with an initial quantity and fresh version.
    pub fn new(id: CounterId, quantity: u64) -> Self {
        Counter {
            id,
            quantity,
            version: 0,
        }
    }

    /// Apply the decrement business rule in memory.
    ///
    /// Rejects a zero amount and any amount that would drive the quantity
    /// negative. On error the counter is unchanged.
    pub fn decrease(&mut self, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }
        let remaining = self
            .quantity
            .checked_sub(amount)
            .ok_or(Error::InsufficientQuantity {
                id: self.id,
                requested: amount,
                available: self.quantity,
            })?;
        self.quantity = remaining;
        Ok(())
    }
}
