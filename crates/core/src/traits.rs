//! Trait seams for external collaborators

use crate::error::CoordinatorError;
use std::time::Duration;
use uuid::Uuid;

/// External lock coordinator contract.
///
/// A shared service reachable by every contending process, arbitrating
/// exclusive ownership of a logical key. There is no blocking wait:
/// `try_acquire` answers immediately and callers that need to wait spin
/// with a sleep between attempts.
///
/// Holder tokens make release ownership-checked: a caller can never release
/// a claim it does not currently hold, even if its original claim expired
/// and the key was reassigned.
pub trait LockCoordinator: Send + Sync {
    /// Attempt to claim `key` for `token`, valid for `ttl`.
    ///
    /// Returns `Ok(true)` if the claim was granted, `Ok(false)` if another
    /// holder owns an unexpired claim, and `Err` only if the coordinator
    /// itself is unreachable.
    fn try_acquire(
        &self,
        key: &str,
        token: Uuid,
        ttl: Duration,
    ) -> std::result::Result<bool, CoordinatorError>;

    /// Release the claim on `key` if `token` still owns it.
    ///
    /// Returns `Ok(true)` if a claim was released, `Ok(false)` if the token
    /// no longer matched (expired and reassigned, or never held).
    fn release(&self, key: &str, token: Uuid) -> std::result::Result<bool, CoordinatorError>;
}
