//! Leak reporting through a registered handler.
//!
//! The handler is process-wide, so every test in this binary shares one
//! collector and filters the reports by buffer identity.

use std::sync::{Mutex, Once};

use valv_buffer::{LeakReport, OwnedBuffer, audit};
use valv_core::BufferId;

static REPORTS: Mutex<Vec<LeakReport>> = Mutex::new(Vec::new());
static INSTALL: Once = Once::new();

fn install_collector() {
    INSTALL.call_once(|| {
        audit::set_leak_handler(|report| {
            REPORTS.lock().unwrap().push(*report);
        });
    });
}

fn reports_for(id: BufferId) -> Vec<LeakReport> {
    REPORTS
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.id == id)
        .copied()
        .collect()
}

#[test]
fn dropping_live_buffer_reports_exactly_once() {
    install_collector();

    let buf = OwnedBuffer::<u64>::new(12).unwrap();
    let id = buf.id();
    drop(buf);

    let reports = reports_for(id);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].size_bytes, 12 * 8);
    assert_ne!(reports[0].address, 0);
    // The storage was still freed: the destructor is deterministic.
    assert!(!audit::live_allocations().iter().any(|r| r.id == id));
}

#[test]
fn released_buffer_reports_nothing() {
    install_collector();

    let mut buf = OwnedBuffer::<u64>::new(4).unwrap();
    let id = buf.id();
    buf.release().unwrap();
    drop(buf);

    assert!(reports_for(id).is_empty());
}

#[test]
fn resized_to_zero_buffer_reports_nothing() {
    install_collector();

    let mut buf = OwnedBuffer::<u32>::new(4).unwrap();
    let id = buf.id();
    buf.resize(0, false).unwrap();
    drop(buf);

    assert!(reports_for(id).is_empty());
}

#[test]
fn inert_buffer_reports_nothing() {
    install_collector();

    let buf = OwnedBuffer::<u8>::new(0).unwrap();
    let id = buf.id();
    drop(buf);

    assert!(reports_for(id).is_empty());
}
