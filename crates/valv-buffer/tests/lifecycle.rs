//! End-to-end lifecycle scenarios for `OwnedBuffer`.

use valv_buffer::{OwnedBuffer, audit};
use valv_core::BufferError;

#[test]
fn fill_resize_extend_scenario() {
    let mut buf = OwnedBuffer::<u8>::new(10).unwrap();
    buf.fill(25).unwrap();
    buf.set(9, 17).unwrap();

    let first: Vec<u8> = (0..10).map(|i| buf.get(i).unwrap()).collect();
    assert_eq!(first, [25, 25, 25, 25, 25, 25, 25, 25, 25, 17]);

    buf.resize(20, true).unwrap();
    buf.slice_from_mut(10).unwrap().fill(42);
    buf.set(19, 100).unwrap();

    let all: Vec<u8> = (0..20).map(|i| buf.get(i).unwrap()).collect();
    assert_eq!(&all[..10], &[25, 25, 25, 25, 25, 25, 25, 25, 25, 17]);
    assert_eq!(&all[10..19], &[42; 9]);
    assert_eq!(all[19], 100);

    buf.release().unwrap();
}

#[test]
fn views_and_indexer_agree_across_lengths() {
    for len in [1usize, 7, 1000] {
        let mut buf = OwnedBuffer::<u64>::new(len).unwrap();
        for (i, cell) in buf.as_mut_slice().unwrap().iter_mut().enumerate() {
            *cell = (i as u64).wrapping_mul(0x9e37_79b9);
        }
        for i in 0..len {
            assert_eq!(buf.get(i).unwrap(), (i as u64).wrapping_mul(0x9e37_79b9));
        }
        buf.release().unwrap();
    }
}

#[test]
fn raw_view_tracks_current_allocation_only() {
    let mut buf = OwnedBuffer::<u32>::new(8).unwrap();
    buf.fill(1).unwrap();

    let view = buf.raw_view().unwrap();
    assert_eq!(view.len(), 8);

    // A resize replaces the allocation; the old view must be recaptured,
    // not reused. The fresh view sees the resized storage.
    buf.resize(16, true).unwrap();
    let fresh = buf.raw_view().unwrap();
    assert_eq!(fresh.len(), 16);
    // SAFETY: `fresh` was captured after the resize and index 0 < 16.
    unsafe {
        assert_eq!(fresh.read(0), 1);
    }

    buf.release().unwrap();
}

#[test]
fn release_is_exactly_once_and_loud_after() {
    let mut buf = OwnedBuffer::<u16>::new(3).unwrap();
    let id = buf.id();
    buf.release().unwrap();

    assert_eq!(buf.release(), Err(BufferError::UseAfterRelease));
    assert_eq!(buf.get(0), Err(BufferError::UseAfterRelease));
    assert_eq!(buf.id(), id);
    assert!(!buf.is_alive());
    assert!(!audit::live_allocations().iter().any(|r| r.id == id));
}
