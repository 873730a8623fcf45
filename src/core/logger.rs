//! Main logger implementation

use super::{
    appender::Appender,
    clock::{Clock, SystemClock},
    config::LoggerConfig,
    error::{LoggerError, Result},
    event_pool::{EventPool, POOL_SLACK},
    frontend::LeveledLog,
    handoff::{self, Producer, DEFAULT_QUEUE_CAPACITY},
    log_event::SourceLocation,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    shutdown::{close_signal, Completion, ShutdownCoordinator, ShutdownGate},
    writer::{stderr_error_callback, ErrorCallback, Writer},
};
use crate::appenders::{ConsoleAppender, HourlyFileAppender};
use parking_lot::Mutex;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

/// Name given to the writer thread
pub const WRITER_THREAD_NAME: &str = "log-writer";

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(DEFAULT_QUEUE_CAPACITY) {
    Some(capacity) => capacity,
    None => panic!("default queue capacity must be non-zero"),
};

/// Where the writer is in its life.
enum Lifecycle {
    /// Constructed; events may already be queued but nothing consumes them
    Idle(Box<Writer>),
    Running(ShutdownCoordinator),
    Stopped,
}

/// Leveled logger with a bounded queue and a single writer thread.
///
/// Construction does no I/O. [`init`](Logger::init) starts the writer;
/// [`uninit`](Logger::uninit) stops accepting events and blocks until every
/// accepted event has been written. Events logged before `init` are queued and
/// written once the writer starts; if more than the queue capacity arrive
/// before that, producers block.
///
/// # Example
///
/// ```no_run
/// use hourly_logger::prelude::*;
/// use hourly_logger::info;
///
/// let logger = Logger::new("./log", LogLevel::Info);
/// logger.init().unwrap();
///
/// info!(logger, "listening on port {}", 8080);
/// logger.warn("disk almost full");
///
/// logger.uninit().unwrap();
/// ```
pub struct Logger {
    level: LogLevel,
    directory_prefix: PathBuf,
    pool: Arc<EventPool>,
    producer: Producer,
    gate: ShutdownGate,
    metrics: Arc<LoggerMetrics>,
    lifecycle: Mutex<Lifecycle>,
}

/// Everything needed to assemble a logger; validated by the caller.
struct Parts {
    directory_prefix: PathBuf,
    level: LogLevel,
    queue_capacity: NonZeroUsize,
    clock: Box<dyn Clock>,
    console: Box<dyn Appender>,
    on_error: ErrorCallback,
}

impl Logger {
    /// Create a logger writing under `directory_prefix` with the default queue
    /// capacity, stdout mirror and stderr error reporting.
    #[must_use]
    pub fn new(directory_prefix: impl Into<PathBuf>, level: LogLevel) -> Self {
        Self::assemble(Parts {
            directory_prefix: directory_prefix.into(),
            level,
            queue_capacity: DEFAULT_CAPACITY,
            clock: Box::new(SystemClock),
            console: Box::new(ConsoleAppender::new()),
            on_error: stderr_error_callback(),
        })
    }

    /// Create a logger from an unvalidated integer level (0 = DEBUG .. 3 = ERROR).
    pub fn with_raw_level(directory_prefix: impl Into<PathBuf>, raw_level: i64) -> Result<Self> {
        let level = LogLevel::from_raw(raw_level)?;
        Ok(Self::new(directory_prefix, level))
    }

    /// Create a logger from a deserialized configuration.
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        Self::builder(config.directory_prefix.clone())
            .level(config.level)
            .queue_capacity(config.queue_capacity)
            .build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use hourly_logger::prelude::*;
    ///
    /// let logger = Logger::builder("./log")
    ///     .level(LogLevel::Debug)
    ///     .queue_capacity(1024)
    ///     .build()
    ///     .unwrap();
    /// ```
    #[must_use]
    pub fn builder(directory_prefix: impl Into<PathBuf>) -> LoggerBuilder {
        LoggerBuilder::new(directory_prefix)
    }

    fn assemble(parts: Parts) -> Self {
        let metrics = Arc::new(LoggerMetrics::new());
        let (producer, consumer) = handoff::channel(parts.queue_capacity, Arc::clone(&metrics));
        let pool = Arc::new(EventPool::with_capacity(parts.queue_capacity.get() + POOL_SLACK));

        let writer = Writer::new(
            consumer,
            Arc::clone(&pool),
            HourlyFileAppender::new(parts.directory_prefix.clone()),
            parts.console,
            parts.clock,
            Arc::clone(&metrics),
            parts.on_error,
        );

        Self {
            level: parts.level,
            directory_prefix: parts.directory_prefix,
            pool,
            producer,
            gate: ShutdownGate::new(),
            metrics,
            lifecycle: Mutex::new(Lifecycle::Idle(Box::new(writer))),
        }
    }

    /// Start the writer thread.
    ///
    /// Fails with [`LoggerError::AlreadyInitialized`] if it is already running
    /// and [`LoggerError::LoggerStopped`] after `uninit`.
    pub fn init(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Idle(writer) => {
                *lifecycle = Lifecycle::Running(Self::start(writer)?);
                Ok(())
            }
            Lifecycle::Running(coordinator) => {
                *lifecycle = Lifecycle::Running(coordinator);
                Err(LoggerError::AlreadyInitialized)
            }
            Lifecycle::Stopped => Err(LoggerError::LoggerStopped),
        }
    }

    /// Stop accepting events and block until everything accepted is written.
    ///
    /// Calls racing with this one are either rejected or fully written. Calling
    /// it before `init` starts the writer just long enough to drain. Later
    /// calls return `Ok(())` immediately.
    pub fn uninit(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        let coordinator = match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Idle(writer) => Self::start(writer)?,
            Lifecycle::Running(coordinator) => coordinator,
            Lifecycle::Stopped => return Ok(()),
        };
        coordinator.shutdown(&self.gate)
    }

    fn start(writer: Box<Writer>) -> Result<ShutdownCoordinator> {
        let (signal, listener) = close_signal();
        let handle = thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || {
                let writer = *writer;
                writer.run(listener)
            })
            .map_err(|e| {
                LoggerError::io_operation("starting writer thread", "Failed to spawn thread", e)
            })?;
        Ok(ShutdownCoordinator::new(signal, Completion::new(handle)))
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn directory_prefix(&self) -> &Path {
        &self.directory_prefix
    }

    /// Whether new events are being rejected
    pub fn is_closed(&self) -> bool {
        self.gate.is_closed()
    }

    /// Whether the writer thread is currently running
    pub fn is_running(&self) -> bool {
        matches!(*self.lifecycle.lock(), Lifecycle::Running(_))
    }

    /// Maximum number of queued events before producers block
    pub fn queue_capacity(&self) -> usize {
        self.producer.capacity()
    }

    /// Events waiting for the writer
    pub fn queue_len(&self) -> usize {
        self.producer.len()
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use hourly_logger::prelude::*;
    ///
    /// let logger = Logger::new("./log", LogLevel::Info);
    /// let metrics = logger.metrics();
    /// println!("Queued: {}", metrics.enqueued());
    /// println!("Written: {}", metrics.written());
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// The arena backing queued events
    pub fn event_pool(&self) -> &EventPool {
        &self.pool
    }
}

impl LeveledLog for Logger {
    fn log_at(&self, level: LogLevel, location: SourceLocation, args: fmt::Arguments<'_>) {
        if level < self.level {
            return;
        }

        let Some(_registration) = self.gate.enter() else {
            self.metrics.record_rejected();
            return;
        };

        let Some(mut checkout) = self.pool.checkout() else {
            return;
        };
        checkout.with(|event| event.assign(level, location, args));

        if let Err(handle) = self.producer.push(checkout.into_handle()) {
            // Writer died without draining
            self.pool.release(handle);
            self.metrics.record_rejected();
        }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level && !self.gate.is_closed()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("directory_prefix", &self.directory_prefix)
            .field("queue_capacity", &self.queue_capacity())
            .field("queue_len", &self.queue_len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.uninit() {
            eprintln!("[LOGGER ERROR] Failed to drain during shutdown: {}", e);
        }

        let failures = self.metrics.write_failures();
        if failures > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shut down after {} failed writes ({} rotation failures)",
                failures,
                self.metrics.rotation_failures()
            );
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use hourly_logger::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder("./log")
///     .level(LogLevel::Debug)
///     .queue_capacity(10_000)
///     .console(ConsoleAppender::stderr())
///     .on_error(Arc::new(|err| {
///         eprintln!("ALERT: {}", err);
///     }))
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    directory_prefix: PathBuf,
    level: LogLevel,
    queue_capacity: usize,
    clock: Box<dyn Clock>,
    console: Box<dyn Appender>,
    on_error: ErrorCallback,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new(directory_prefix: impl Into<PathBuf>) -> Self {
        Self {
            directory_prefix: directory_prefix.into(),
            level: LogLevel::Info,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            clock: Box::new(SystemClock),
            console: Box::new(ConsoleAppender::new()),
            on_error: stderr_error_callback(),
        }
    }

    /// Set the level threshold
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the handoff queue capacity (must be non-zero)
    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Replace the wall-clock source used for timestamps and rotation
    #[must_use = "builder methods return a new value"]
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the console mirror
    #[must_use = "builder methods return a new value"]
    pub fn console<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.console = Box::new(appender);
        self
    }

    /// Set the callback receiving rotation and write errors from the writer
    ///
    /// Defaults to printing them on stderr.
    #[must_use = "builder methods return a new value"]
    pub fn on_error(mut self, callback: ErrorCallback) -> Self {
        self.on_error = callback;
        self
    }

    /// Build the Logger
    pub fn build(self) -> Result<Logger> {
        let queue_capacity = handoff::validate_capacity(self.queue_capacity)?;
        Ok(Logger::assemble(Parts {
            directory_prefix: self.directory_prefix,
            level: self.level,
            queue_capacity,
            clock: self.clock,
            console: self.console,
            on_error: self.on_error,
        }))
    }
}
