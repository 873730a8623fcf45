//! Leveled logging interface injected into call sites

use super::log_event::SourceLocation;
use super::log_level::LogLevel;
use std::fmt;

/// The capability set handed to code that wants to log.
///
/// Only [`log_at`](LeveledLog::log_at) and [`enabled`](LeveledLog::enabled)
/// need implementing; the per-level methods capture the caller's location and
/// forward. The trait is object safe, so `&dyn LeveledLog` or
/// `Arc<dyn LeveledLog>` can be passed around instead of a global logger.
///
/// # Example
///
/// ```
/// use hourly_logger::prelude::*;
///
/// fn handle_request(log: &dyn LeveledLog, id: u64) {
///     log.infof(format_args!("handling request {}", id));
/// }
///
/// let logger = Logger::new("./log", LogLevel::Warn);
/// handle_request(&logger, 7);
/// ```
pub trait LeveledLog: Send + Sync {
    /// Submit a message at `level` attributed to `location`.
    ///
    /// Implementations check the threshold before formatting `args`.
    fn log_at(&self, level: LogLevel, location: SourceLocation, args: fmt::Arguments<'_>);

    /// Whether a message at `level` would be accepted right now
    fn enabled(&self, level: LogLevel) -> bool;

    #[track_caller]
    fn debug(&self, message: &str) {
        self.log_at(LogLevel::Debug, SourceLocation::caller(), format_args!("{}", message));
    }

    #[track_caller]
    fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log_at(LogLevel::Debug, SourceLocation::caller(), args);
    }

    #[track_caller]
    fn info(&self, message: &str) {
        self.log_at(LogLevel::Info, SourceLocation::caller(), format_args!("{}", message));
    }

    #[track_caller]
    fn infof(&self, args: fmt::Arguments<'_>) {
        self.log_at(LogLevel::Info, SourceLocation::caller(), args);
    }

    #[track_caller]
    fn warn(&self, message: &str) {
        self.log_at(LogLevel::Warn, SourceLocation::caller(), format_args!("{}", message));
    }

    #[track_caller]
    fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log_at(LogLevel::Warn, SourceLocation::caller(), args);
    }

    #[track_caller]
    fn error(&self, message: &str) {
        self.log_at(LogLevel::Error, SourceLocation::caller(), format_args!("{}", message));
    }

    #[track_caller]
    fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log_at(LogLevel::Error, SourceLocation::caller(), args);
    }
}
