//! Error types for the logger system

use std::path::Path;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON configuration error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Log directory could not be created during rotation
    #[error("Failed to create log directory '{path}': {source}")]
    DirectoryCreate {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Log file could not be opened during rotation
    #[error("Failed to open log file '{path}': {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A formatted line could not be written to a sink
    #[error("Failed to write to {sink}: {source}")]
    WriteFailed {
        sink: String,
        #[source]
        source: std::io::Error,
    },

    /// Raw level outside DEBUG..=ERROR
    #[error("Invalid log level {0}: expected 0 (DEBUG) through 3 (ERROR)")]
    InvalidLevel(i64),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// `init` called on a logger whose writer is already running
    #[error("Logger already initialized")]
    AlreadyInitialized,

    /// Logger already stopped
    #[error("Logger already stopped")]
    LoggerStopped,

    /// The writer thread panicked before finishing its drain
    #[error("Writer thread panicked: {0}")]
    WorkerPanicked(String),

    /// A sink panicked while handling a line
    #[error("Appender '{sink}' panicked: {message}")]
    AppenderPanicked { sink: String, message: String },
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a directory creation error
    pub fn directory_create(path: &Path, source: std::io::Error) -> Self {
        LoggerError::DirectoryCreate {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a file open error
    pub fn file_open(path: &Path, source: std::io::Error) -> Self {
        LoggerError::FileOpen {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a sink write error
    pub fn write_failed(sink: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::WriteFailed {
            sink: sink.into(),
            source,
        }
    }

    /// Create a sink panic error
    pub fn appender_panicked(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::AppenderPanicked {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the filesystem (directories, files, writes)
    pub fn is_filesystem(&self) -> bool {
        matches!(
            self,
            LoggerError::IoOperation { .. }
                | LoggerError::IoError(_)
                | LoggerError::DirectoryCreate { .. }
                | LoggerError::FileOpen { .. }
                | LoggerError::WriteFailed { .. }
        )
    }

    /// Whether this error was caused by invalid construction parameters
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidLevel(_)
                | LoggerError::InvalidConfiguration { .. }
                | LoggerError::JsonError(_)
        )
    }
}

/// Extract a readable message from a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
