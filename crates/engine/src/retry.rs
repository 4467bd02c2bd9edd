//! Retry policy for the spin-wait and optimistic strategies
//!
//! The reference behavior for both loops is to retry forever. That is a
//! liveness risk, not a guarantee anyone depends on, so the bound is explicit
//! and configurable here: generous defaults that a healthy workload never
//! hits, surfacing `RetriesExhausted` instead of hanging when something is
//! genuinely stuck.

use std::time::Duration;

/// Fixed sleep between optimistic retry attempts.
pub const OPTIMISTIC_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Fixed sleep between spin-wait acquisition attempts.
pub const SPIN_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Default attempt bound for the optimistic retry loop.
pub const OPTIMISTIC_MAX_ATTEMPTS: u32 = 1_000;

/// Default attempt bound for the spin-wait loop.
pub const SPIN_MAX_ATTEMPTS: u32 = 600;

/// A bounded fixed-interval retry policy.
///
/// No backoff growth: the interval between attempts is constant, matching
/// the spin-wait model. Sleeps go through `std::thread::sleep`, so the
/// waiting thread is descheduled rather than busy-spinning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts before giving up
    pub max_attempts: u32,
    /// Fixed sleep between attempts
    pub interval: Duration,
}

impl RetryPolicy {
    /// Create a policy with an explicit bound and interval.
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// Default policy for the optimistic strategy: 50 ms between attempts.
    pub fn optimistic_default() -> Self {
        RetryPolicy::new(OPTIMISTIC_MAX_ATTEMPTS, OPTIMISTIC_RETRY_INTERVAL)
    }

    /// Default policy for spin-wait lock acquisition: 100 ms between attempts.
    pub fn spin_default() -> Self {
        RetryPolicy::new(SPIN_MAX_ATTEMPTS, SPIN_RETRY_INTERVAL)
    }

    /// Sleep for the configured interval, descheduling the thread.
    pub(crate) fn pause(&self) {
        std::thread::sleep(self.interval);
    }
}
