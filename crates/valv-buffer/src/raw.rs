//! Low-level primitives for raw heap allocation.
//!
//! This module wraps the platform heap (`std::alloc`) in typed,
//! element-count-oriented helpers and performs no bookkeeping of its own.
//! It is the only place in the workspace that calls the allocator
//! directly. Every `unsafe` operation carries a `SAFETY:` comment.
//!
//! Out-of-memory policy, stated explicitly: an allocation request whose
//! byte size cannot even be described to the allocator is a recoverable
//! [`BufferError::ResourceExhausted`]; a null return from the platform
//! allocator for a well-formed request is fatal via
//! [`std::alloc::handle_alloc_error`]. There is no silent-corruption path.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use valv_core::BufferError;

/// Marker for element types that may live in raw, never-zero-initialized
/// buffer storage.
///
/// # Safety
///
/// Implementors must guarantee that:
///
/// - every possible bit pattern is a valid value of the type, so reading
///   storage that was never explicitly written yields an unspecified but
///   valid value rather than undefined behavior;
/// - the type has a non-zero size (the allocator is never asked for
///   zero-sized layouts; zero-length buffers simply do not allocate).
///
/// The provided implementations cover the primitive integers and floats.
/// `bool`, `char`, references, and enums with niches must NOT implement
/// this trait.
pub unsafe trait Element: Copy + Send + 'static {}

macro_rules! impl_element {
    ($($ty:ty),* $(,)?) => {
        $(
            // SAFETY: primitive integer and float types accept every bit
            // pattern and have non-zero size.
            unsafe impl Element for $ty {}
        )*
    };
}

impl_element!(u8, i8, u16, i16, u32, i32, u64, i64, u128, i128, usize, isize, f32, f64);

/// Allocate storage for `len` elements of `T` from the platform heap.
///
/// The storage is NOT zero-initialized. Callers must not read an element
/// before writing it unless they accept an unspecified value (which the
/// [`Element`] contract makes defined, not undefined).
///
/// `len` must be non-zero; zero-length buffers never reach this layer.
pub(crate) fn alloc_elements<T: Element>(len: usize) -> Result<NonNull<T>, BufferError> {
    debug_assert!(len > 0, "zero-length requests never allocate");
    let layout = Layout::array::<T>(len).map_err(|_| BufferError::ResourceExhausted {
        requested_bytes: len.saturating_mul(std::mem::size_of::<T>()),
    })?;
    // SAFETY: `Element` guarantees a non-zero element size and `len > 0`,
    // so `layout.size() > 0` as `alloc` requires.
    let ptr = unsafe { alloc::alloc(layout) };
    match NonNull::new(ptr.cast::<T>()) {
        Some(ptr) => Ok(ptr),
        // Fatal by policy: a well-formed request the platform cannot satisfy.
        None => alloc::handle_alloc_error(layout),
    }
}

/// Release storage previously obtained from [`alloc_elements`].
///
/// # Safety
///
/// `ptr` must have been returned by `alloc_elements::<T>(len)` with this
/// exact `len`, and must not have been freed already. Passing a null
/// pointer is unrepresentable here (`NonNull`); double-free prevention is
/// the buffer state machine's responsibility, not this layer's.
pub(crate) unsafe fn free_elements<T: Element>(ptr: NonNull<T>, len: usize) {
    let layout = Layout::array::<T>(len)
        .expect("layout was describable at allocation time, so it still is");
    // SAFETY: caller guarantees `ptr` came from `alloc` with this layout
    // and has not been freed.
    unsafe { alloc::dealloc(ptr.as_ptr().cast::<u8>(), layout) };
}

/// Bulk-copy `count` contiguous elements between two distinct allocations.
///
/// # Safety
///
/// `src` must be valid for reads of `count` elements, `dst` valid for
/// writes of `count` elements, and the two regions must not overlap
/// (resize always copies between a fresh allocation and the old one, so
/// overlap cannot occur on the buffer's own paths).
pub(crate) unsafe fn copy_elements<T: Element>(src: NonNull<T>, dst: NonNull<T>, count: usize) {
    // SAFETY: contract forwarded to the caller verbatim.
    unsafe { std::ptr::copy_nonoverlapping(src.as_ptr(), dst.as_ptr(), count) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_free_round_trip() {
        let ptr = alloc_elements::<u64>(16).unwrap();
        // SAFETY: freshly allocated for 16 u64s, freed exactly once.
        unsafe { free_elements(ptr, 16) };
    }

    #[test]
    fn copy_moves_prefix() {
        let src = alloc_elements::<u32>(4).unwrap();
        let dst = alloc_elements::<u32>(4).unwrap();
        // SAFETY: both allocations are live and distinct; indices < 4.
        unsafe {
            for i in 0..4 {
                src.as_ptr().add(i).write(i as u32 * 10);
            }
            copy_elements(src, dst, 4);
            for i in 0..4 {
                assert_eq!(dst.as_ptr().add(i).read(), i as u32 * 10);
            }
            free_elements(src, 4);
            free_elements(dst, 4);
        }
    }

    #[test]
    fn undescribable_layout_is_recoverable() {
        let result = alloc_elements::<u64>(usize::MAX / 2);
        assert!(matches!(
            result,
            Err(BufferError::ResourceExhausted { .. })
        ));
    }
}
