//! Fixed arena of reusable log event records
//!
//! Records are addressed by index. A free list (a bounded channel holding every
//! index that is not checked out) hands slots to producers and takes them back
//! from the writer, so steady-state logging allocates nothing per call once a
//! slot's content buffer has grown to fit typical messages.

use super::log_event::LogEvent;
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Extra slots beyond the queue capacity, covering producers that hold a record
/// while blocked on a full queue plus the one the writer is formatting.
pub const POOL_SLACK: usize = 64;

/// Exclusive claim on one pool slot.
///
/// Not `Clone`: moving the handle is how ownership of the record passes from
/// producer to queue to writer and back to the pool.
#[derive(Debug, PartialEq, Eq)]
pub struct EventHandle {
    index: usize,
}

impl EventHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

pub struct EventPool {
    slots: Box<[Mutex<LogEvent>]>,
    free_tx: Sender<usize>,
    free_rx: Receiver<usize>,
    in_use: AtomicUsize,
    high_water: AtomicUsize,
}

impl EventPool {
    /// Create a pool with exactly `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        let slots: Box<[Mutex<LogEvent>]> = (0..capacity)
            .map(|_| Mutex::new(LogEvent::default()))
            .collect();
        let (free_tx, free_rx) = bounded(capacity);
        for index in 0..capacity {
            // Cannot fail: capacity matches and both ends are alive
            let _ = free_tx.try_send(index);
        }

        Self {
            slots,
            free_tx,
            free_rx,
            in_use: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
        }
    }

    /// Check out a record, blocking while every slot is in use.
    ///
    /// The record holds whatever the previous user left in it.
    pub fn acquire(&self) -> Option<EventHandle> {
        let index = self.free_rx.recv().ok()?;
        let in_use = self.in_use.fetch_add(1, Ordering::Relaxed) + 1;
        self.high_water.fetch_max(in_use, Ordering::Relaxed);
        Some(EventHandle { index })
    }

    /// Return a record to the pool.
    pub fn release(&self, handle: EventHandle) {
        #[cfg(debug_assertions)]
        self.slots[handle.index].lock().mark_stale();

        self.in_use.fetch_sub(1, Ordering::Relaxed);
        // The free list has room for every index, so this never blocks
        let _ = self.free_tx.try_send(handle.index);
    }

    /// Check out a record guarded against unwinding: if the guard is dropped
    /// before [`Checkout::into_handle`], the slot goes back to the pool.
    pub fn checkout(&self) -> Option<Checkout<'_>> {
        let handle = self.acquire()?;
        Some(Checkout {
            pool: self,
            index: handle.index,
            armed: true,
        })
    }

    /// Run `f` against the record behind `handle`.
    ///
    /// The slot mutex is uncontended: only the handle's owner reaches it.
    pub fn with<R>(&self, handle: &EventHandle, f: impl FnOnce(&mut LogEvent) -> R) -> R {
        let mut event = self.slots[handle.index].lock();
        f(&mut event)
    }

    /// Total number of records in the arena
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Records currently checked out
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Relaxed)
    }

    /// Highest number of simultaneously checked-out records observed
    pub fn high_water(&self) -> usize {
        self.high_water.load(Ordering::Relaxed)
    }
}

/// A record being filled on the producer side.
///
/// Filling runs user `Display` code, which may panic.
pub struct Checkout<'a> {
    pool: &'a EventPool,
    index: usize,
    armed: bool,
}

impl Checkout<'_> {
    pub fn with<R>(&mut self, f: impl FnOnce(&mut LogEvent) -> R) -> R {
        let mut event = self.pool.slots[self.index].lock();
        f(&mut event)
    }

    /// Hand the filled record on; the guard no longer releases it.
    pub fn into_handle(mut self) -> EventHandle {
        self.armed = false;
        EventHandle { index: self.index }
    }
}

impl Drop for Checkout<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.pool.release(EventHandle { index: self.index });
        }
    }
}

impl std::fmt::Debug for EventPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPool")
            .field("capacity", &self.capacity())
            .field("in_use", &self.in_use())
            .field("high_water", &self.high_water())
            .finish()
    }
}
