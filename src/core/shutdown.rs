//! Shutdown coordination: admission gate, close signal and completion handle
//!
//! Producers register with the [`ShutdownGate`] before touching the queue. On
//! shutdown the gate is closed first, then the owner waits until no producer is
//! in flight, and only then raises the close signal. Every event admitted by the
//! gate is therefore in the queue before the writer starts its final drain.

use super::error::{panic_message, LoggerError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

#[derive(Debug, Default)]
pub struct ShutdownGate {
    closing: AtomicBool,
    in_flight: AtomicUsize,
    /// Paired with `drained`; guards nothing, only orders the wakeup
    idle: Mutex<()>,
    drained: Condvar,
}

/// Registration of one producer call; dropping it leaves the gate.
#[must_use = "the producer is only registered while the guard is alive"]
pub struct GateGuard<'a> {
    gate: &'a ShutdownGate,
}

impl ShutdownGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a producer, or `None` if the gate is already closed.
    pub fn enter(&self) -> Option<GateGuard<'_>> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if self.closing.load(Ordering::SeqCst) {
            self.leave();
            return None;
        }
        Some(GateGuard { gate: self })
    }

    fn leave(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _idle = self.idle.lock();
            self.drained.notify_all();
        }
    }

    /// Refuse all further producers.
    pub fn close(&self) {
        self.closing.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Block until every registered producer has left.
    ///
    /// Producers may be blocked on a full queue, so the writer must be running.
    pub fn wait_quiescent(&self) {
        let mut idle = self.idle.lock();
        while self.in_flight.load(Ordering::SeqCst) != 0 {
            self.drained.wait(&mut idle);
        }
    }
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.leave();
    }
}

/// Create a linked close signal and listener.
pub fn close_signal() -> (CloseSignal, CloseListener) {
    let (tx, rx) = bounded(0);
    (CloseSignal { tx }, CloseListener { rx })
}

/// Owner side of the close signal. Raising it disconnects the channel, which
/// wakes the listener exactly once and stays observable afterwards.
#[derive(Debug)]
pub struct CloseSignal {
    tx: Sender<()>,
}

impl CloseSignal {
    pub fn raise(self) {
        drop(self.tx);
    }
}

#[derive(Debug)]
pub struct CloseListener {
    rx: Receiver<()>,
}

impl CloseListener {
    pub fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}

/// Handle on the writer thread that the owner waits on for drain completion.
#[derive(Debug)]
pub struct Completion {
    handle: thread::JoinHandle<()>,
}

impl Completion {
    pub fn new(handle: thread::JoinHandle<()>) -> Self {
        Self { handle }
    }

    /// Block until the writer has drained and exited.
    pub fn wait(self) -> Result<()> {
        self.handle
            .join()
            .map_err(|payload| LoggerError::WorkerPanicked(panic_message(payload.as_ref())))
    }
}

/// Everything the owner needs to stop a running writer.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    close: CloseSignal,
    completion: Completion,
}

impl ShutdownCoordinator {
    pub fn new(close: CloseSignal, completion: Completion) -> Self {
        Self { close, completion }
    }

    /// Close the gate, wait for in-flight producers, signal the writer and wait
    /// for its drain to finish. There is no timeout.
    pub fn shutdown(self, gate: &ShutdownGate) -> Result<()> {
        gate.close();
        gate.wait_quiescent();
        self.close.raise();
        self.completion.wait()
    }
}
