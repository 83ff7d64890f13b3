//! Strongly-typed buffer identity.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`BufferId`] allocation.
static BUFFER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a buffer object.
///
/// Allocated from a monotonic atomic counter via [`BufferId::next`].
/// Two distinct buffer objects always have different IDs, even when one
/// is created right after another is dropped and lands at the same heap
/// address. The pool relies on this to make object reuse observable:
/// a rented buffer that came from the free list carries the ID it was
/// recycled with, not a fresh one.
///
/// IDs also key the allocation audit trail, so a leak report can be
/// correlated with the buffer that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u64);

impl BufferId {
    /// Allocate a fresh, unique buffer ID.
    ///
    /// Each call returns an ID that has never been returned before within
    /// this process. Thread-safe.
    pub fn next() -> Self {
        Self(BUFFER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value, for logging and correlation.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = BufferId::next();
        let b = BufferId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn ids_are_monotonic() {
        let a = BufferId::next();
        let b = BufferId::next();
        assert!(b > a);
    }

    #[test]
    fn display_matches_value() {
        let id = BufferId::next();
        assert_eq!(format!("{id}"), format!("{}", id.value()));
    }
}
