//! External lock coordinator for stockpile
//!
//! In-process stand-in for the shared lock service the distributed-mutex
//! strategy coordinates through. Claims are keyed strings owned by a holder
//! token and valid for a TTL; an expired claim is reclaimable by any new
//! holder, which is what keeps a crash mid-critical-section from deadlocking
//! every later caller.
//!
//! # Thread Safety
//!
//! Claims live in a `DashMap`; try-acquire and release each operate under
//! the claim's exclusive entry guard, so two callers can never both be
//! granted the same key.

#![warn(missing_docs)]
#![warn(clippy::all)]

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use stockpile_core::{CoordinatorError, LockCoordinator};
use tracing::{trace, warn};
use uuid::Uuid;

/// A granted claim on a lock key.
#[derive(Debug, Clone)]
struct Claim {
    token: Uuid,
    acquired_at: Instant,
    ttl: Duration,
}

impl Claim {
    fn new(token: Uuid, ttl: Duration) -> Self {
        Claim {
            token,
            acquired_at: Instant::now(),
            ttl,
        }
    }

    fn expired(&self) -> bool {
        self.acquired_at.elapsed() >= self.ttl
    }
}

/// In-memory lock coordinator.
///
/// Implements the [`LockCoordinator`] contract: non-blocking try-acquire
/// with a holder token and TTL, and ownership-checked release. There is no
/// queued wait; callers that need to wait spin outside.
pub struct InMemoryCoordinator {
    claims: DashMap<String, Claim>,
}

impl InMemoryCoordinator {
    /// Create a coordinator with no outstanding claims.
    pub fn new() -> Self {
        InMemoryCoordinator {
            claims: DashMap::new(),
        }
    }

    /// Token of the current unexpired holder of `key`, if any.
    pub fn holder(&self, key: &str) -> Option<Uuid> {
        self.claims
            .get(key)
            .filter(|claim| !claim.expired())
            .map(|claim| claim.token)
    }
}

impl Default for InMemoryCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl LockCoordinator for InMemoryCoordinator {
    fn try_acquire(
        &self,
        key: &str,
        token: Uuid,
        ttl: Duration,
    ) -> std::result::Result<bool, CoordinatorError> {
        match self.claims.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if entry.get().expired() {
                    trace!(key, %token, "reclaiming expired lock");
                    entry.insert(Claim::new(token, ttl));
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(entry) => {
                trace!(key, %token, "lock granted");
                entry.insert(Claim::new(token, ttl));
                Ok(true)
            }
        }
    }

    fn release(&self, key: &str, token: Uuid) -> std::result::Result<bool, CoordinatorError> {
        let released = self
            .claims
            .remove_if(key, |_, claim| claim.token == token)
            .is_some();
        if !released {
            // expired-and-reassigned or never held; releasing here would
            // steal the lock from its current owner
            warn!(key, %token, "release skipped, token no longer holds the lock");
        }
        Ok(released)
    }
}
