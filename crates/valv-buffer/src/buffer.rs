//! The growable, explicitly-owned buffer and its lifecycle state machine.
//!
//! [`OwnedBuffer<T>`] owns at most one contiguous heap allocation and
//! tracks its lifecycle as an explicit tagged state rather than a nullable
//! pointer, so the state machine is exhaustive and checkable:
//!
//! ```text
//! new(n > 0) ──────────────► Live ──release()──► Released   (terminal)
//! new(0) ───► Inert             │
//!               ▲              resize(0)
//!               └───────────────┘
//!               └──reallocate(n)──► Live          (pool path only)
//! ```
//!
//! Element access is bounds-checked and fails with structured errors;
//! slices are ordinary Rust borrows, so the compiler rules out use across
//! a resize or release. The unchecked escape hatch is
//! [`RawView`](crate::RawView), which deliberately opts out of both.

use std::fmt;
use std::ptr::NonNull;

use valv_core::{BufferError, BufferId};

use crate::audit::{self, AllocationRecord, LeakReport};
use crate::raw::{self, Element};
use crate::view::RawView;

/// Where a buffer's storage currently is.
///
/// `Live` owns an allocation of `len > 0` elements. `Inert` is the
/// zero-length state: nothing was ever allocated (or the allocation was
/// returned via `resize(0)`), and resize/release are forbidden from here.
/// `Released` is terminal.
#[derive(Clone, Copy)]
enum Storage<T> {
    Live { ptr: NonNull<T>, len: usize },
    Inert,
    Released,
}

/// A growable, bounds-checked buffer of fixed-size elements with an
/// explicit ownership lifecycle.
///
/// The buffer allocates on construction (for non-zero lengths), grows and
/// shrinks via [`resize`](Self::resize), and must be disposed of exactly
/// once via [`release`](Self::release). Dropping a live buffer without
/// releasing it frees the storage — destructors run deterministically —
/// but is treated as a caller mistake and reported through the leak hook
/// in [`audit`](crate::audit).
///
/// A buffer is single-owner: it is `Send` (ownership may move between
/// threads, which the pool relies on) but not `Sync`, and it performs no
/// internal locking.
///
/// Storage is never zero-initialized. Reading an element that was never
/// written yields an unspecified value; the [`Element`] bound is what
/// makes that defined behavior.
pub struct OwnedBuffer<T: Element> {
    id: BufferId,
    storage: Storage<T>,
}

// SAFETY: the buffer is the sole owner of its allocation and `Element`
// requires `T: Send`, so moving the buffer to another thread moves the
// storage with it. No shared interior state exists (`!Sync` stands).
unsafe impl<T: Element> Send for OwnedBuffer<T> {}

impl<T: Element> OwnedBuffer<T> {
    /// Create a buffer of `len` elements.
    ///
    /// A non-zero `len` allocates immediately; the contents are NOT
    /// zero-initialized. `len == 0` yields a valid but inert buffer that
    /// holds no allocation and can never be resized or released.
    ///
    /// Fails with [`BufferError::ResourceExhausted`] if `len` elements
    /// cannot be described to the allocator. True out-of-memory aborts
    /// (see [`crate`] docs for the policy).
    pub fn new(len: usize) -> Result<Self, BufferError> {
        let id = BufferId::next();
        if len == 0 {
            return Ok(Self {
                id,
                storage: Storage::Inert,
            });
        }
        let ptr = raw::alloc_elements::<T>(len)?;
        audit::track(AllocationRecord {
            id,
            address: ptr.as_ptr() as usize,
            size_bytes: len * std::mem::size_of::<T>(),
        });
        Ok(Self {
            id,
            storage: Storage::Live { ptr, len },
        })
    }

    /// The buffer's process-unique identity.
    ///
    /// Identity is assigned at construction and survives resize, release,
    /// and pooling — a rented buffer that came from a pool's free list
    /// carries the ID it was recycled with.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Current element count. Zero for inert and released buffers.
    pub fn len(&self) -> usize {
        match self.storage {
            Storage::Live { len, .. } => len,
            Storage::Inert | Storage::Released => 0,
        }
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the buffer currently owns a live allocation.
    ///
    /// False for both inert and released buffers; this is the one query
    /// that is valid in every state.
    pub fn is_alive(&self) -> bool {
        matches!(self.storage, Storage::Live { .. })
    }

    /// Whether the buffer has been explicitly released.
    ///
    /// Distinguishes the terminal released state from the inert
    /// zero-length state, which also reports `is_alive() == false`.
    pub fn is_released(&self) -> bool {
        matches!(self.storage, Storage::Released)
    }

    /// Size of the owned storage in bytes.
    ///
    /// Always recomputed from the element count so it can never drift
    /// from [`len`](Self::len) after a resize.
    pub fn size_bytes(&self) -> usize {
        self.len() * std::mem::size_of::<T>()
    }

    /// Read the element at `index`.
    ///
    /// Fails with [`BufferError::UseAfterRelease`] on a released buffer
    /// and [`BufferError::IndexOutOfRange`] outside `[0, len)`.
    pub fn get(&self, index: usize) -> Result<T, BufferError> {
        match self.storage {
            Storage::Released => Err(BufferError::UseAfterRelease),
            Storage::Live { ptr, len } if index < len => {
                // SAFETY: the allocation is live and `index < len`.
                Ok(unsafe { ptr.as_ptr().add(index).read() })
            }
            Storage::Live { len, .. } => Err(BufferError::IndexOutOfRange { index, len }),
            Storage::Inert => Err(BufferError::IndexOutOfRange { index, len: 0 }),
        }
    }

    /// Write `value` to the element at `index`.
    ///
    /// Same failure contract as [`get`](Self::get).
    pub fn set(&mut self, index: usize, value: T) -> Result<(), BufferError> {
        match self.storage {
            Storage::Released => Err(BufferError::UseAfterRelease),
            Storage::Live { ptr, len } if index < len => {
                // SAFETY: the allocation is live and `index < len`.
                unsafe { ptr.as_ptr().add(index).write(value) };
                Ok(())
            }
            Storage::Live { len, .. } => Err(BufferError::IndexOutOfRange { index, len }),
            Storage::Inert => Err(BufferError::IndexOutOfRange { index, len: 0 }),
        }
    }

    /// Borrow the whole buffer as a slice.
    ///
    /// Inert buffers yield an empty slice; released buffers fail with
    /// [`BufferError::UseAfterRelease`].
    pub fn as_slice(&self) -> Result<&[T], BufferError> {
        match self.storage {
            Storage::Released => Err(BufferError::UseAfterRelease),
            Storage::Inert => Ok(&[]),
            Storage::Live { ptr, len } => {
                // SAFETY: live allocation of `len` elements; the shared
                // borrow of `self` blocks resize/release for the slice's
                // lifetime.
                Ok(unsafe { std::slice::from_raw_parts(ptr.as_ptr(), len) })
            }
        }
    }

    /// Borrow the whole buffer as a mutable slice.
    pub fn as_mut_slice(&mut self) -> Result<&mut [T], BufferError> {
        match self.storage {
            Storage::Released => Err(BufferError::UseAfterRelease),
            Storage::Inert => Ok(&mut []),
            Storage::Live { ptr, len } => {
                // SAFETY: live allocation of `len` elements; the unique
                // borrow of `self` blocks all other access.
                Ok(unsafe { std::slice::from_raw_parts_mut(ptr.as_ptr(), len) })
            }
        }
    }

    /// Borrow the suffix starting at `start`.
    ///
    /// `start` must lie in `[0, len)`: `start == len` is rejected with
    /// [`BufferError::IndexOutOfRange`] even though it would be a valid
    /// one-past-end bound elsewhere. Use
    /// [`slice_range(start, 0)`](Self::slice_range) for an empty view.
    pub fn slice_from(&self, start: usize) -> Result<&[T], BufferError> {
        let full = self.as_slice()?;
        if start >= full.len() {
            return Err(BufferError::IndexOutOfRange {
                index: start,
                len: full.len(),
            });
        }
        Ok(&full[start..])
    }

    /// Mutable variant of [`slice_from`](Self::slice_from).
    pub fn slice_from_mut(&mut self, start: usize) -> Result<&mut [T], BufferError> {
        let len = self.len();
        let full = self.as_mut_slice()?;
        if start >= len {
            return Err(BufferError::IndexOutOfRange { index: start, len });
        }
        Ok(&mut full[start..])
    }

    /// Borrow `count` elements starting at `start`.
    ///
    /// Fails with [`BufferError::IndexOutOfRange`] unless
    /// `start + count <= len` (overflow included). A `count` of zero is
    /// always a valid empty view, even at `start == len`.
    pub fn slice_range(&self, start: usize, count: usize) -> Result<&[T], BufferError> {
        let full = self.as_slice()?;
        let end = match start.checked_add(count) {
            Some(end) if end <= full.len() => end,
            _ => {
                return Err(BufferError::IndexOutOfRange {
                    index: start.saturating_add(count),
                    len: full.len(),
                })
            }
        };
        Ok(&full[start..end])
    }

    /// Mutable variant of [`slice_range`](Self::slice_range).
    pub fn slice_range_mut(&mut self, start: usize, count: usize) -> Result<&mut [T], BufferError> {
        let len = self.len();
        let full = self.as_mut_slice()?;
        let end = match start.checked_add(count) {
            Some(end) if end <= len => end,
            _ => {
                return Err(BufferError::IndexOutOfRange {
                    index: start.saturating_add(count),
                    len,
                })
            }
        };
        Ok(&mut full[start..end])
    }

    /// Write `value` to every element.
    pub fn fill(&mut self, value: T) -> Result<(), BufferError> {
        self.as_mut_slice()?.fill(value);
        Ok(())
    }

    /// Replace the allocation with one of `new_len` elements.
    ///
    /// When `keep_original` is true the overlapping prefix of
    /// `min(len, new_len)` elements is copied into the new allocation;
    /// elements beyond it are NOT initialized. `resize(0, _)` frees the
    /// allocation and leaves the buffer inert — the one path from live
    /// back to the zero-length state without releasing.
    ///
    /// Fails with [`BufferError::UseAfterRelease`] on a released buffer
    /// and [`BufferError::InvalidOperation`] on an inert one (zero-length
    /// buffers are terminal for resize; recreate or rent instead).
    ///
    /// Any [`RawView`] captured before a resize dangles afterwards; that
    /// hazard is documented on the view, not detected here.
    pub fn resize(&mut self, new_len: usize, keep_original: bool) -> Result<(), BufferError> {
        match self.storage {
            Storage::Released => Err(BufferError::UseAfterRelease),
            Storage::Inert => Err(BufferError::InvalidOperation {
                reason: "cannot resize a zero-length buffer; create or rent a new one".to_string(),
            }),
            Storage::Live { ptr, len } => {
                if new_len == 0 {
                    audit::untrack(self.id);
                    // SAFETY: the allocation is live and freed exactly once;
                    // the state moves to Inert immediately after.
                    unsafe { raw::free_elements(ptr, len) };
                    self.storage = Storage::Inert;
                    return Ok(());
                }
                let new_ptr = raw::alloc_elements::<T>(new_len)?;
                if keep_original {
                    let prefix = len.min(new_len);
                    // SAFETY: both allocations are live and distinct, and
                    // `prefix` fits in each.
                    unsafe { raw::copy_elements(ptr, new_ptr, prefix) };
                }
                // SAFETY: the old allocation is live and freed exactly once.
                unsafe { raw::free_elements(ptr, len) };
                audit::retrack(
                    self.id,
                    new_ptr.as_ptr() as usize,
                    new_len * std::mem::size_of::<T>(),
                );
                self.storage = Storage::Live {
                    ptr: new_ptr,
                    len: new_len,
                };
                Ok(())
            }
        }
    }

    /// Explicitly dispose of the buffer.
    ///
    /// Frees the allocation, marks the buffer released, and suppresses
    /// the drop-time leak report. Fails with
    /// [`BufferError::InvalidOperation`] on an inert buffer (there is
    /// nothing to release, mirroring the no-resize-from-zero rule) and
    /// [`BufferError::UseAfterRelease`] if already released.
    pub fn release(&mut self) -> Result<(), BufferError> {
        match self.storage {
            Storage::Released => Err(BufferError::UseAfterRelease),
            Storage::Inert => Err(BufferError::InvalidOperation {
                reason: "cannot release a zero-length buffer; it never allocated".to_string(),
            }),
            Storage::Live { ptr, len } => {
                audit::untrack(self.id);
                // SAFETY: the allocation is live; the state moves to
                // Released immediately after, so no second free can occur.
                unsafe { raw::free_elements(ptr, len) };
                self.storage = Storage::Released;
                Ok(())
            }
        }
    }

    /// Allocate fresh storage in place over an inert buffer.
    ///
    /// This is the pool's re-arm operation: a fresh allocation with no
    /// copy, preserving the buffer's identity. It is the only way out of
    /// the inert state. Fails with [`BufferError::InvalidOperation`] if
    /// the buffer still holds a live allocation and
    /// [`BufferError::UseAfterRelease`] if it was released.
    /// `reallocate(0)` is a no-op that stays inert.
    pub fn reallocate(&mut self, new_len: usize) -> Result<(), BufferError> {
        match self.storage {
            Storage::Released => Err(BufferError::UseAfterRelease),
            Storage::Live { .. } => Err(BufferError::InvalidOperation {
                reason: "buffer still holds a live allocation; resize or release it first"
                    .to_string(),
            }),
            Storage::Inert => {
                if new_len == 0 {
                    return Ok(());
                }
                let ptr = raw::alloc_elements::<T>(new_len)?;
                audit::track(AllocationRecord {
                    id: self.id,
                    address: ptr.as_ptr() as usize,
                    size_bytes: new_len * std::mem::size_of::<T>(),
                });
                self.storage = Storage::Live { ptr, len: new_len };
                Ok(())
            }
        }
    }

    /// Capture an unchecked pointer-and-length view of the storage.
    ///
    /// The view performs no bounds or liveness checks and does not keep
    /// the buffer alive — see [`RawView`] for the full contract. An inert
    /// buffer yields a dangling, zero-length view (harmless because every
    /// index is out of its bounds). Fails with
    /// [`BufferError::UseAfterRelease`] on a released buffer.
    pub fn raw_view(&self) -> Result<RawView<T>, BufferError> {
        match self.storage {
            Storage::Released => Err(BufferError::UseAfterRelease),
            Storage::Inert => Ok(RawView::dangling()),
            Storage::Live { ptr, len } => Ok(RawView::new(ptr, len)),
        }
    }
}

impl<T: Element> Drop for OwnedBuffer<T> {
    /// Deterministic teardown.
    ///
    /// Dropping a live buffer frees its storage but counts as a leak:
    /// the owner never called [`release`](OwnedBuffer::release). The
    /// storage is freed before the report is delivered; the report
    /// carries the address as plain data, never a dereferenceable
    /// pointer.
    fn drop(&mut self) {
        if let Storage::Live { ptr, len } = self.storage {
            let report = LeakReport {
                id: self.id,
                address: ptr.as_ptr() as usize,
                size_bytes: len * std::mem::size_of::<T>(),
            };
            audit::untrack(self.id);
            // SAFETY: the allocation is live and freed exactly once; the
            // state moves to Released before anything can observe it.
            unsafe { raw::free_elements(ptr, len) };
            self.storage = Storage::Released;
            audit::report_leak(&report);
        }
    }
}

impl<T: Element> fmt::Debug for OwnedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.storage {
            Storage::Live { .. } => "live",
            Storage::Inert => "inert",
            Storage::Released => "released",
        };
        f.debug_struct("OwnedBuffer")
            .field("id", &self.id)
            .field("state", &state)
            .field("len", &self.len())
            .finish()
    }
}
