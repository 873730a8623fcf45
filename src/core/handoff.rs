//! Bounded handoff queue between producer threads and the writer

use super::error::{LoggerError, Result};
use super::event_pool::EventHandle;
use super::metrics::LoggerMetrics;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Default queue capacity in events
pub const DEFAULT_QUEUE_CAPACITY: usize = 100_000;

/// Check a requested capacity.
///
/// A zero capacity would turn the queue into a rendezvous point and is rejected.
pub fn validate_capacity(capacity: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(capacity).ok_or_else(|| {
        LoggerError::config("HandoffQueue", "queue capacity must be at least 1")
    })
}

/// Create a queue holding at most `capacity` events.
pub fn channel(capacity: NonZeroUsize, metrics: Arc<LoggerMetrics>) -> (Producer, Consumer) {
    let (tx, rx) = bounded(capacity.get());
    (Producer { tx, metrics }, Consumer { rx })
}

/// Producer side, shared by every logging thread.
#[derive(Debug)]
pub struct Producer {
    tx: Sender<EventHandle>,
    metrics: Arc<LoggerMetrics>,
}

impl Producer {
    /// Push an event, blocking while the queue is full.
    ///
    /// Gives the handle back if the writer side is gone.
    pub fn push(&self, handle: EventHandle) -> std::result::Result<(), EventHandle> {
        match self.tx.try_send(handle) {
            Ok(()) => {}
            Err(TrySendError::Full(handle)) => {
                self.metrics.record_blocked_push();
                self.tx.send(handle).map_err(|e| e.into_inner())?;
            }
            Err(TrySendError::Disconnected(handle)) => return Err(handle),
        }
        self.metrics.record_enqueued();
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }
}

/// Consumer side, owned by the writer.
#[derive(Debug)]
pub struct Consumer {
    rx: Receiver<EventHandle>,
}

impl Consumer {
    /// Take the next event if one is queued.
    pub fn try_pop(&self) -> Option<EventHandle> {
        match self.rx.try_recv() {
            Ok(handle) => Some(handle),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Underlying receiver, for waiting on it alongside the close signal
    pub fn receiver(&self) -> &Receiver<EventHandle> {
        &self.rx
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
