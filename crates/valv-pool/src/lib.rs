//! Concurrent object pooling for valv buffers.
//!
//! A [`BufferPool`] recycles buffer *objects*, not memory: recycling
//! frees the buffer's allocation immediately, and renting always
//! performs a fresh allocation into the pooled object. What the pool
//! preserves is object identity ([`BufferId`](valv_core::BufferId)) —
//! there is no path by which stale data can survive a recycle/rent
//! cycle, and rented contents are unspecified, never "previous owner's
//! bytes".
//!
//! The free list is a bounded MPMC channel, so any number of threads
//! may rent and recycle through clones of one pool handle without
//! external locking. [`PoolRegistry`] composes per-element-type pools
//! behind a single explicitly constructed object.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod pool;
pub mod registry;

pub use config::PoolConfig;
pub use pool::BufferPool;
pub use registry::PoolRegistry;
