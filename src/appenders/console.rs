//! Console appender implementation

use crate::core::{Appender, LoggerError, Result};
use std::io::{self, Write};

/// Mirrors every formatted line to a console stream (stdout by default).
pub struct ConsoleAppender {
    writer: Box<dyn Write + Send>,
    name: String,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Mirror to stderr instead of stdout
    pub fn stderr() -> Self {
        Self::with_writer(io::stderr()).with_name("stderr")
    }

    /// Mirror into an arbitrary writer
    ///
    /// # Example
    ///
    /// ```
    /// use hourly_logger::appenders::ConsoleAppender;
    ///
    /// let appender = ConsoleAppender::with_writer(Vec::new());
    /// ```
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Box::new(writer),
            name: "console".to_string(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, line: &str) -> Result<()> {
        self.writer
            .write_all(line.as_bytes())
            .map_err(|e| LoggerError::write_failed(self.name.as_str(), e))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| LoggerError::write_failed(self.name.as_str(), e))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
