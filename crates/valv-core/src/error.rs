//! Error types for buffer lifecycle and access failures.
//!
//! All failures are local, synchronous, and recoverable by the caller,
//! with one exception: true out-of-memory (the platform allocator
//! returning null) is fatal by explicit policy and never surfaces here.
//! Leak detection is a separate reporting channel, not an error value —
//! it fires from drop glue, outside any caller's call stack.

use std::error::Error;
use std::fmt;

/// Errors returned by buffer and pool operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// A construction or slicing argument that can never be satisfied.
    InvalidArgument {
        /// Human-readable description of the rejected argument.
        reason: String,
    },
    /// An index or range outside the buffer's current bounds.
    IndexOutOfRange {
        /// The offending index (for ranges, the exclusive end).
        index: usize,
        /// The buffer's current element count.
        len: usize,
    },
    /// An operation on a buffer that has already been released.
    ///
    /// Released buffers are terminal: everything except liveness and
    /// identity queries fails with this error, including a second release.
    UseAfterRelease,
    /// An operation that the buffer's current state forbids.
    ///
    /// Covers resizing or releasing a zero-length (inert) buffer and
    /// reallocating over a buffer that still holds a live allocation.
    InvalidOperation {
        /// Human-readable description of the state conflict.
        reason: String,
    },
    /// The requested allocation cannot be described to the allocator
    /// (element count times element size overflows the addressable range).
    ResourceExhausted {
        /// Total bytes the request would have needed.
        requested_bytes: usize,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { reason } => {
                write!(f, "invalid argument: {reason}")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for buffer of length {len}")
            }
            Self::UseAfterRelease => {
                write!(f, "buffer has been released")
            }
            Self::InvalidOperation { reason } => {
                write!(f, "invalid operation: {reason}")
            }
            Self::ResourceExhausted { requested_bytes } => {
                write!(
                    f,
                    "allocation of {requested_bytes} bytes cannot be represented"
                )
            }
        }
    }
}

impl Error for BufferError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_bounds() {
        let err = BufferError::IndexOutOfRange { index: 10, len: 10 };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("out of range"));
    }

    #[test]
    fn errors_compare_by_payload() {
        let a = BufferError::IndexOutOfRange { index: 1, len: 4 };
        let b = BufferError::IndexOutOfRange { index: 1, len: 4 };
        let c = BufferError::IndexOutOfRange { index: 2, len: 4 };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
