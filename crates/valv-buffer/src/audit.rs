//! Leak reporting and the allocation audit trail.
//!
//! Buffers free their storage deterministically when dropped, so a leak
//! in this library is not lost memory — it is a live buffer that was
//! dropped without an explicit [`release`](crate::OwnedBuffer::release)
//! call, meaning the owner lost track of the lifecycle. That event is
//! reported here, exactly once per buffer, *before* the storage is freed.
//!
//! Two mechanisms exist:
//!
//! - a process-wide, swappable **leak handler** consulted from drop glue.
//!   With no handler registered the default policy is a loud panic —
//!   leaks are never silently ignored. The handler runs on whichever
//!   thread drops the buffer; there is no synchronous-with-owner
//!   guarantee.
//! - an **allocation registry** recording every live allocation, for
//!   test-teardown audits via [`live_allocations`] and
//!   [`assert_no_live_allocations`]. The registry is process-wide rather
//!   than per-thread because pooled buffers legally cross threads.

use std::sync::{Arc, Mutex, PoisonError};

use smallvec::SmallVec;
use valv_core::BufferId;

/// Description of a leaked buffer, passed to the leak handler.
///
/// Produced exactly once per leaked buffer. The allocation is reported as
/// a numeric address rather than a pointer: the buffer's destructor frees
/// the block immediately after the handler returns, so a handler must
/// only record, never dereference or free.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeakReport {
    /// Identity of the leaked buffer.
    pub id: BufferId,
    /// Address of the leaked allocation at the time of the report.
    pub address: usize,
    /// Size of the leaked allocation in bytes.
    pub size_bytes: usize,
}

/// One live allocation in the audit registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocationRecord {
    /// Identity of the owning buffer.
    pub id: BufferId,
    /// Address of the allocation.
    pub address: usize,
    /// Size of the allocation in bytes.
    pub size_bytes: usize,
}

/// Shared handle to a registered leak handler.
pub type LeakHandler = Arc<dyn Fn(&LeakReport) + Send + Sync>;

static LEAK_HANDLER: Mutex<Option<LeakHandler>> = Mutex::new(None);
static REGISTRY: Mutex<Vec<AllocationRecord>> = Mutex::new(Vec::new());

/// Register the process-wide leak handler, replacing any previous one.
///
/// Only one handler exists at a time — registration replaces, it does not
/// stack. Returns the handler that was displaced, if any.
pub fn set_leak_handler(
    handler: impl Fn(&LeakReport) + Send + Sync + 'static,
) -> Option<LeakHandler> {
    LEAK_HANDLER
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(Arc::new(handler))
}

/// Remove the process-wide leak handler, restoring the default policy.
///
/// Returns the handler that was removed, if any.
pub fn clear_leak_handler() -> Option<LeakHandler> {
    LEAK_HANDLER
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
}

/// Deliver a leak report to the registered handler or the default policy.
///
/// Called from buffer drop glue, never from a caller's stack frame.
pub(crate) fn report_leak(report: &LeakReport) {
    let handler = LEAK_HANDLER
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match handler {
        Some(handler) => handler(report),
        None => {
            // Default policy: loud. Panicking while the thread is already
            // unwinding would abort the process and mask the original
            // failure, so the report falls back to stderr in that case.
            if std::thread::panicking() {
                eprintln!(
                    "buffer {} leaked {} bytes at {:#x}; release() was never called",
                    report.id, report.size_bytes, report.address
                );
            } else {
                panic!(
                    "buffer {} leaked {} bytes at {:#x}; release() was never called",
                    report.id, report.size_bytes, report.address
                );
            }
        }
    }
}

fn registry() -> std::sync::MutexGuard<'static, Vec<AllocationRecord>> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Record a fresh allocation in the audit registry.
pub(crate) fn track(record: AllocationRecord) {
    registry().push(record);
}

/// Update the registry entry for `id` after a reallocation.
pub(crate) fn retrack(id: BufferId, address: usize, size_bytes: usize) {
    let mut records = registry();
    if let Some(record) = records.iter_mut().find(|r| r.id == id) {
        record.address = address;
        record.size_bytes = size_bytes;
    }
}

/// Remove the registry entry for `id` after its allocation is freed.
pub(crate) fn untrack(id: BufferId) {
    let mut records = registry();
    if let Some(pos) = records.iter().position(|r| r.id == id) {
        records.swap_remove(pos);
    }
}

/// Snapshot of all currently live allocations.
pub fn live_allocations() -> SmallVec<[AllocationRecord; 8]> {
    registry().iter().copied().collect()
}

/// Total bytes currently held by live allocations.
pub fn live_bytes() -> usize {
    registry().iter().map(|r| r.size_bytes).sum()
}

/// Test-teardown audit: panic if any allocation is still live.
///
/// Intended for the end of a test that owns every buffer it created.
/// Under a parallel test runner the registry is shared by all tests in
/// the process, so prefer checking specific [`BufferId`]s via
/// [`live_allocations`] when other tests may hold buffers concurrently.
pub fn assert_no_live_allocations() {
    let records = live_allocations();
    assert!(
        records.is_empty(),
        "allocation audit failed: {} live allocation(s) remain: {records:?}",
        records.len(),
    );
}
