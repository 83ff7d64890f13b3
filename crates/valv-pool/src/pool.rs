//! The per-element-type buffer pool.

use crossbeam_channel::{Receiver, Sender, TrySendError};

use valv_buffer::{Element, OwnedBuffer};
use valv_core::BufferError;

use crate::config::PoolConfig;

/// A concurrent pool of reusable buffer objects for one element type.
///
/// The pool holds inert buffers — objects whose storage has already been
/// returned — and re-arms one on [`rent`](Self::rent) with a fresh
/// allocation. Cloning the pool is cheap and every clone shares the same
/// free list, so a pool handle can be passed to any number of threads;
/// the free list itself is a bounded MPMC channel and needs no external
/// locking.
///
/// Rented buffers are ordinary [`OwnedBuffer`]s: the renter owns them
/// outright and may [`release`](OwnedBuffer::release) instead of
/// recycling, at the cost of losing the object for reuse.
#[derive(Clone)]
pub struct BufferPool<T: Element> {
    idle_tx: Sender<OwnedBuffer<T>>,
    idle_rx: Receiver<OwnedBuffer<T>>,
    config: PoolConfig,
}

impl<T: Element> BufferPool<T> {
    /// Create a pool with the given configuration.
    pub fn new(config: PoolConfig) -> Self {
        let (idle_tx, idle_rx) = crossbeam_channel::bounded(config.max_idle);
        Self {
            idle_tx,
            idle_rx,
            config,
        }
    }

    /// Rent a buffer of `len` elements.
    ///
    /// Pops an idle object and re-arms it with a fresh allocation, or
    /// constructs a new buffer when the free list is empty. Either way
    /// the contents are unspecified (never zeroed, never a previous
    /// owner's data — the previous allocation was freed at recycle
    /// time). A pooled object keeps the [`id`](OwnedBuffer::id) it was
    /// recycled with.
    pub fn rent(&self, len: usize) -> Result<OwnedBuffer<T>, BufferError> {
        match self.idle_rx.try_recv() {
            Ok(mut buffer) => {
                if let Err(err) = buffer.reallocate(len) {
                    // The object is still inert and perfectly reusable;
                    // only this request was unsatisfiable.
                    let _ = self.idle_tx.try_send(buffer);
                    return Err(err);
                }
                Ok(buffer)
            }
            Err(_) => OwnedBuffer::new(len),
        }
    }

    /// Return a buffer to the pool.
    ///
    /// Frees the buffer's current allocation through the resize-to-zero
    /// path — not [`release`](OwnedBuffer::release), so none of the
    /// disposal machinery fires and the object stays recyclable — and
    /// pushes the inert object onto the free list. A full free list
    /// quietly drops the surplus object.
    ///
    /// Fails with [`BufferError::UseAfterRelease`] when handed a buffer
    /// that was already released: released objects are terminal and can
    /// never re-enter circulation.
    pub fn recycle(&self, mut buffer: OwnedBuffer<T>) -> Result<(), BufferError> {
        if buffer.is_released() {
            return Err(BufferError::UseAfterRelease);
        }
        if buffer.is_alive() {
            buffer.resize(0, false)?;
        }
        if let Err(TrySendError::Full(surplus) | TrySendError::Disconnected(surplus)) =
            self.idle_tx.try_send(buffer)
        {
            // Inert, so dropping it is silent: no storage, no leak report.
            drop(surplus);
        }
        Ok(())
    }

    /// Number of idle objects currently available for reuse.
    pub fn idle_count(&self) -> usize {
        self.idle_rx.len()
    }

    /// The pool's configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}
