//! Appender trait for log output destinations

use super::error::Result;

/// A destination for fully formatted lines.
///
/// Appenders are owned by the writer thread and never shared, hence `Send`
/// without `Sync`.
pub trait Appender: Send {
    /// Write one formatted line (already newline-terminated).
    fn append(&mut self, line: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
