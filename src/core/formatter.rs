//! Fixed line layout
//!
//! ```text
//! 2021-08-18 19:55:21 [INFO] [server.rs192] listening
//! ```

use super::log_event::LogEvent;
use chrono::NaiveDateTime;
use std::fmt::Write as _;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append one formatted line for `event` to `buf`.
///
/// A newline is added unless the content already ends with one.
pub fn format_line(buf: &mut String, now: &NaiveDateTime, event: &LogEvent) {
    let _ = write!(
        buf,
        "{} {} [{}{}] {}",
        now.format(TIMESTAMP_FORMAT),
        event.level.tag(),
        event.file,
        event.line,
        event.content
    );
    if !event.content.ends_with('\n') {
        buf.push('\n');
    }
}
