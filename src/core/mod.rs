//! Core logger types and traits

pub mod appender;
pub mod clock;
pub mod config;
pub mod error;
pub mod event_pool;
pub mod formatter;
pub mod frontend;
pub mod handoff;
pub mod log_event;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod shutdown;
pub mod writer;

pub use appender::Appender;
pub use clock::{Clock, SystemClock};
pub use config::LoggerConfig;
pub use error::{LoggerError, Result};
pub use event_pool::{Checkout, EventHandle, EventPool, POOL_SLACK};
pub use formatter::{format_line, TIMESTAMP_FORMAT};
pub use frontend::LeveledLog;
pub use handoff::DEFAULT_QUEUE_CAPACITY;
pub use log_event::{basename, LogEvent, SourceLocation};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, WRITER_THREAD_NAME};
pub use metrics::LoggerMetrics;
pub use writer::{stderr_error_callback, ErrorCallback};
