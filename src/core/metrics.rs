//! Logger metrics for observability
//!
//! Provides counters for monitoring the pipeline: how many events were queued,
//! written, rejected after close, how often producers hit backpressure, and how
//! rotation and writes fared.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use hourly_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_enqueued();
/// metrics.record_written();
///
/// assert_eq!(metrics.enqueued(), 1);
/// assert_eq!(metrics.written(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Events pushed onto the handoff queue
    enqueued: AtomicU64,

    /// Events formatted and handed to the sinks
    written: AtomicU64,

    /// Sink writes that failed (the line is dropped for that sink)
    write_failures: AtomicU64,

    /// Successful hourly file swaps
    rotations: AtomicU64,

    /// Rotation attempts that failed and left the previous sink active
    rotation_failures: AtomicU64,

    /// Pushes that found the queue full and had to wait
    blocked_pushes: AtomicU64,

    /// Calls that passed the level filter but were not queued: arrived after
    /// close, or found the writer gone
    rejected: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            written: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            rotation_failures: AtomicU64::new(0),
            blocked_pushes: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotation_failures(&self) -> u64 {
        self.rotation_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn blocked_pushes(&self) -> u64 {
        self.blocked_pushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Record an event pushed onto the queue
    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    /// Record an event handed to the sinks
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a failed sink write
    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a completed file rotation
    #[inline]
    pub fn record_rotation(&self) -> u64 {
        self.rotations.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a failed file rotation
    #[inline]
    pub fn record_rotation_failure(&self) -> u64 {
        self.rotation_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a push that waited on a full queue
    #[inline]
    pub fn record_blocked_push(&self) -> u64 {
        self.blocked_pushes.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a call rejected because the logger is closed
    #[inline]
    pub fn record_rejected(&self) -> u64 {
        self.rejected.fetch_add(1, Ordering::Relaxed)
    }

}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            written: AtomicU64::new(self.written()),
            write_failures: AtomicU64::new(self.write_failures()),
            rotations: AtomicU64::new(self.rotations()),
            rotation_failures: AtomicU64::new(self.rotation_failures()),
            blocked_pushes: AtomicU64::new(self.blocked_pushes()),
            rejected: AtomicU64::new(self.rejected()),
        }
    }
}
