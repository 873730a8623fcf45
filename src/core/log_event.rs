//! Log event record and caller location

use super::log_level::LogLevel;
use std::fmt::{self, Write as _};
use std::panic::Location;

/// Source position of a logging call, reduced to the file's basename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl SourceLocation {
    /// Build a location from `file!()`/`line!()` output; the path is cut to its basename.
    pub fn new(file: &'static str, line: u32) -> Self {
        Self {
            file: basename(file),
            line,
        }
    }

    /// Location of the caller of the enclosing `#[track_caller]` function.
    #[track_caller]
    pub fn caller() -> Self {
        let location: &'static Location<'static> = Location::caller();
        Self::new(location.file(), location.line())
    }
}

/// Final path segment, accepting both `/` and `\` separators.
pub fn basename(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}

#[cfg(debug_assertions)]
const STALE_FILE: &str = "<released>";

/// One captured log record awaiting formatting.
///
/// Records live in the [`EventPool`](super::event_pool::EventPool) and are
/// reused; whoever fills one must go through [`LogEvent::assign`], which
/// overwrites every field.
#[derive(Debug, Clone, Default)]
pub struct LogEvent {
    pub level: LogLevel,
    pub content: String,
    pub file: &'static str,
    pub line: u32,
}

impl LogEvent {
    /// Overwrite every field. The content buffer keeps its capacity.
    pub fn assign(&mut self, level: LogLevel, location: SourceLocation, args: fmt::Arguments<'_>) {
        self.level = level;
        self.content.clear();
        // Writing into a String only fails if a Display impl reports an error
        let _ = self.content.write_fmt(args);
        self.file = location.file;
        self.line = location.line;
    }

    /// Mark a released record so stale reuse is detectable in debug builds.
    #[cfg(debug_assertions)]
    pub(crate) fn mark_stale(&mut self) {
        self.file = STALE_FILE;
        self.line = u32::MAX;
    }

    /// Whether this record still carries the marker left by a release.
    #[cfg(debug_assertions)]
    pub fn is_stale(&self) -> bool {
        self.file == STALE_FILE && self.line == u32::MAX
    }
}
