//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. They work on
//! anything implementing [`LeveledLog`](crate::LeveledLog), record the
//! invoking file and line, and skip formatting entirely when the level is
//! filtered out.
//!
//! # Examples
//!
//! ```
//! use hourly_logger::prelude::*;
//! use hourly_logger::info;
//!
//! # let dir = tempfile::tempdir().unwrap();
//! let logger = Logger::builder(dir.path())
//!     .console(ConsoleAppender::with_writer(std::io::sink()))
//!     .build()
//!     .unwrap();
//! logger.init().unwrap();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! logger.uninit().unwrap();
//! ```

/// Log a message at the given level.
///
/// # Examples
///
/// ```
/// # use hourly_logger::prelude::*;
/// # let dir = tempfile::tempdir().unwrap();
/// # let logger = Logger::builder(dir.path())
/// #     .console(ConsoleAppender::with_writer(std::io::sink()))
/// #     .build()
/// #     .unwrap();
/// use hourly_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        #[allow(unused_imports)]
        use $crate::LeveledLog as _;
        $logger.log_at(
            $level,
            $crate::SourceLocation::new(file!(), line!()),
            format_args!($($arg)+),
        )
    }};
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use hourly_logger::prelude::*;
/// # let dir = tempfile::tempdir().unwrap();
/// # let logger = Logger::builder(dir.path())
/// #     .level(LogLevel::Debug)
/// #     .console(ConsoleAppender::with_writer(std::io::sink()))
/// #     .build()
/// #     .unwrap();
/// use hourly_logger::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use hourly_logger::prelude::*;
/// # let dir = tempfile::tempdir().unwrap();
/// # let logger = Logger::builder(dir.path())
/// #     .console(ConsoleAppender::with_writer(std::io::sink()))
/// #     .build()
/// #     .unwrap();
/// use hourly_logger::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}
