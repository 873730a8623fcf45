//! # Hourly Logger
//!
//! An in-process leveled logger. Call sites hand events to a bounded queue and
//! return; a single writer thread formats each one as
//!
//! ```text
//! 2024-01-02 03:04:05 [INFO] [main.rs42] listening
//! ```
//!
//! and appends it to `<prefix>/<YYYY-MM-DD>/<YYYYMMDD_HH>.log`, starting a new
//! file at every hour boundary, while mirroring the same line to the console.
//!
//! ## Features
//!
//! - **Non-blocking call sites**: events below the threshold cost one compare;
//!   accepted events reuse pooled records and only block when the queue is full
//! - **Hourly rotation**: per-day directories, one file per hour, appended to
//!   across restarts
//! - **Lossless shutdown**: [`Logger::uninit`] returns only after every accepted
//!   event is on disk
//! - **Injectable**: code logs through the object-safe [`LeveledLog`] trait
//!
//! ## Example
//!
//! ```no_run
//! use hourly_logger::prelude::*;
//! use hourly_logger::{error, info};
//!
//! let logger = Logger::new("./log", LogLevel::Info);
//! logger.init().unwrap();
//!
//! info!(logger, "service started on port {}", 8080);
//! error!(logger, "lost connection to {}", "db-1");
//!
//! logger.uninit().unwrap();
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, HourlyFileAppender, RotationPolicy};
    pub use crate::core::{
        Appender, Clock, ErrorCallback, EventPool, LeveledLog, LogLevel, Logger, LoggerBuilder,
        LoggerConfig, LoggerError, LoggerMetrics, Result, SourceLocation, SystemClock,
    };
}

pub use appenders::{ConsoleAppender, HourlyFileAppender, RotationPolicy};
pub use core::{
    Appender, Clock, ErrorCallback, EventPool, LeveledLog, LogLevel, Logger, LoggerBuilder,
    LoggerConfig, LoggerError, LoggerMetrics, Result, SourceLocation, SystemClock,
};
