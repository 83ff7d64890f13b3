//! Explicitly-owned, bounds-checked growable heap buffers.
//!
//! This crate is the core of the valv workspace: a safety layer over raw
//! heap allocation. It is the one workspace member that may contain
//! `unsafe` code; all of it sits in the small `raw` module and in the
//! documented unchecked [`RawView`], each site with a `SAFETY:` comment.
//!
//! # Architecture
//!
//! ```text
//! OwnedBuffer<T> (lifecycle state machine: Live / Inert / Released)
//! ├── raw (platform heap: alloc / free / bulk copy, no bookkeeping)
//! ├── RawView<T> (unchecked pointer+length escape hatch)
//! └── audit (leak handler + live-allocation registry)
//! ```
//!
//! A buffer owns at most one contiguous allocation and must be disposed
//! of exactly once via [`OwnedBuffer::release`]. Destructors run
//! deterministically, so a dropped-but-unreleased buffer does not lose
//! memory — it is reported through [`audit`] as a lifecycle mistake.
//!
//! # Out-of-memory policy
//!
//! Requests whose byte size cannot be described to the allocator fail
//! with a recoverable error; a null return from the platform allocator
//! for a well-formed request aborts via `std::alloc::handle_alloc_error`.
//! Allocation is never zero-initializing — the [`Element`] marker trait
//! is what makes reads of unwritten storage defined.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod audit;
pub mod buffer;
mod raw;
pub mod view;

// Public re-exports for the primary API surface.
pub use audit::{AllocationRecord, LeakHandler, LeakReport};
pub use buffer::OwnedBuffer;
pub use raw::Element;
pub use view::RawView;
