//! valv: explicitly-owned heap buffers with bounds checking, leak
//! auditing, and object pooling.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all valv sub-crates. For most users, adding `valv` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use valv::prelude::*;
//!
//! // A tiny line accumulator — the kind of consumer this library
//! // exists to support. It owns one growable byte buffer and must
//! // release it exactly once.
//! let mut buf = OwnedBuffer::<u8>::new(4).unwrap();
//! let mut used = 0;
//! for &byte in b"valv says hello" {
//!     if used == buf.len() {
//!         // Double the storage, keeping what has been written so far.
//!         buf.resize(used * 2, true).unwrap();
//!     }
//!     buf.set(used, byte).unwrap();
//!     used += 1;
//! }
//! assert_eq!(buf.slice_range(0, used).unwrap(), b"valv says hello");
//! buf.release().unwrap();
//!
//! // The same workload against a pool amortizes object construction:
//! // recycling frees the storage, renting re-arms the object fresh.
//! let pool = BufferPool::<u8>::new(PoolConfig::default());
//! let mut scratch = pool.rent(64).unwrap();
//! scratch.fill(b'.').unwrap();
//! let first = scratch.id();
//! pool.recycle(scratch).unwrap();
//!
//! let reused = pool.rent(16).unwrap();
//! assert_eq!(reused.id(), first);
//! pool.recycle(reused).unwrap();
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for items not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`buffer`] | `valv-buffer` | `OwnedBuffer`, `RawView`, `Element`, leak audit |
//! | [`pool`] | `valv-pool` | `BufferPool`, `PoolRegistry`, `PoolConfig` |
//! | [`types`] | `valv-core` | `BufferId`, `BufferError` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Buffers, raw views, and the allocation audit (`valv-buffer`).
///
/// Most users only need [`buffer::OwnedBuffer`] from this module — it is
/// also available in the [`prelude`]. The leak handler and allocation
/// registry live in [`buffer::audit`].
pub use valv_buffer as buffer;

/// Object pooling (`valv-pool`).
///
/// [`pool::BufferPool`] recycles buffer objects for one element type;
/// [`pool::PoolRegistry`] composes one pool per element type behind an
/// explicitly constructed handle.
pub use valv_pool as pool;

/// Core identifiers and errors (`valv-core`).
///
/// Contains [`types::BufferId`] and the [`types::BufferError`] enum that
/// every fallible operation in the workspace returns.
pub use valv_core as types;

/// Common imports for typical valv usage.
///
/// ```rust
/// use valv::prelude::*;
/// ```
pub mod prelude {
    // Buffers and views
    pub use valv_buffer::{Element, OwnedBuffer, RawView};

    // Pooling
    pub use valv_pool::{BufferPool, PoolConfig, PoolRegistry};

    // Identity and errors
    pub use valv_core::{BufferError, BufferId};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn facade_reexports_compose() {
        let registry = PoolRegistry::new(PoolConfig::new(4));
        let pool = registry.pool::<u32>();

        let mut buf: OwnedBuffer<u32> = pool.rent(8).unwrap();
        buf.fill(11).unwrap();
        assert_eq!(buf.get(7), Ok(11));
        assert!(matches!(
            buf.get(8),
            Err(BufferError::IndexOutOfRange { index: 8, len: 8 })
        ));
        pool.recycle(buf).unwrap();
    }
}
