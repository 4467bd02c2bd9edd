//! Identifier and version-token types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version token attached to every stored counter.
///
/// Advanced by the store on each committed write. Opaque to callers except
/// the optimistic strategy, which uses it to detect concurrent modification.
pub type Version = u64;

/// Stable identifier of a counter.
///
/// Immutable after creation. Counters are keyed by this id in the store and
/// in lock tables derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CounterId(pub u64);

impl CounterId {
    /// Raw numeric value of this id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Lock-table key derived from this id.
    ///
    /// Both lock-based strategies key their exclusive claim on this string,
    /// so a counter is always guarded by the same logical resource name.
    pub fn lock_key(&self) -> String {
        format!("counter:{}", self.0)
    }
}

impl fmt::Display for CounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CounterId {
    fn from(raw: u64) -> Self {
        CounterId(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_id_display() {
        assert_eq!(CounterId(42).to_string(), "42");
    }

    #[test]
    fn test_lock_key_is_stable() {
        let id = CounterId(7);
        assert_eq!(id.lock_key(), "counter:7");
        assert_eq!(id.lock_key(), CounterId(7).lock_key());
    }

    #[test]
    fn test_from_u64() {
        let id: CounterId = 9.into();
        assert_eq!(id.as_u64(), 9);
    }
}
