//! Hourly rotating file appender
//!
//! Lines are written to `<prefix>/<YYYY-MM-DD>/<YYYYMMDD_HH>.log`. The writer
//! asks the appender to rotate once per event; the first event of a new hour
//! pays for creating the directory and opening the file, every other event in
//! that hour only compares four integers.

use crate::core::appender::Appender;
use crate::core::error::{LoggerError, Result};
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Per-day directory name, e.g. `2024-01-02`
pub const DIRECTORY_FORMAT: &str = "%Y-%m-%d";

/// Per-hour file name, e.g. `20240102_03.log`
pub const FILE_NAME_FORMAT: &str = "%Y%m%d_%H.log";

/// Calendar hour a file covers; any field change means a new file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HourKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl HourKey {
    pub fn of(now: &NaiveDateTime) -> Self {
        Self {
            year: now.year(),
            month: now.month(),
            day: now.day(),
            hour: now.hour(),
        }
    }
}

/// Decides when the active file must be swapped and where the next one lives.
///
/// # Examples
///
/// ```
/// use hourly_logger::appenders::RotationPolicy;
/// use chrono::NaiveDate;
/// use std::path::Path;
///
/// let policy = RotationPolicy::new("/var/log/app");
/// let now = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(14, 0, 1).unwrap();
///
/// assert_eq!(
///     policy.file_path_for(&now),
///     Path::new("/var/log/app/2024-01-02/20240102_14.log")
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    directory_prefix: PathBuf,
}

impl RotationPolicy {
    pub fn new(directory_prefix: impl Into<PathBuf>) -> Self {
        Self {
            directory_prefix: directory_prefix.into(),
        }
    }

    pub fn directory_prefix(&self) -> &Path {
        &self.directory_prefix
    }

    /// True when `now` falls in a different calendar hour than `last`,
    /// or when nothing has been opened yet.
    pub fn needs_rotation(&self, last: Option<HourKey>, now: &NaiveDateTime) -> bool {
        last != Some(HourKey::of(now))
    }

    pub fn directory_for(&self, now: &NaiveDateTime) -> PathBuf {
        self.directory_prefix
            .join(now.format(DIRECTORY_FORMAT).to_string())
    }

    pub fn file_path_for(&self, now: &NaiveDateTime) -> PathBuf {
        self.directory_for(now)
            .join(now.format(FILE_NAME_FORMAT).to_string())
    }
}

/// Result of a rotation check that did not fail outright.
#[derive(Debug)]
pub enum Rotation {
    /// Same hour as the open file
    Unchanged,
    /// A new file is active
    Rotated,
    /// A new file is active but the outgoing one lost its buffered tail
    RotatedFlushFailed(LoggerError),
}

/// Where lines currently go.
enum OutputSink {
    /// Before the first file is opened
    Console(io::Stderr),
    File {
        path: PathBuf,
        writer: BufWriter<File>,
    },
}

/// File appender that switches to a new file at every hour boundary.
///
/// # Examples
///
/// ```no_run
/// use hourly_logger::appenders::HourlyFileAppender;
/// use hourly_logger::Appender;
/// use chrono::Local;
///
/// let mut appender = HourlyFileAppender::new("./log");
/// let now = Local::now().naive_local();
/// appender.rotate_if_needed(&now).unwrap();
/// appender.append("2024-01-02 03:04:05 [INFO] [main.rs10] started\n").unwrap();
/// ```
pub struct HourlyFileAppender {
    policy: RotationPolicy,
    sink: OutputSink,
    /// Hour of the file currently open
    last_rotation: Option<HourKey>,
}

impl HourlyFileAppender {
    /// Create the appender. No directory or file is touched until the first rotation.
    pub fn new(directory_prefix: impl Into<PathBuf>) -> Self {
        Self::with_policy(RotationPolicy::new(directory_prefix))
    }

    pub fn with_policy(policy: RotationPolicy) -> Self {
        Self {
            policy,
            sink: OutputSink::Console(io::stderr()),
            last_rotation: None,
        }
    }

    /// Swap to the file for `now` if its hour differs from the open file's.
    ///
    /// On a directory or open failure the previous sink stays active and the
    /// hour is not recorded, so the next event retries. A failed flush of the
    /// outgoing file does not undo the swap.
    pub fn rotate_if_needed(&mut self, now: &NaiveDateTime) -> Result<Rotation> {
        if !self.policy.needs_rotation(self.last_rotation, now) {
            return Ok(Rotation::Unchanged);
        }

        let dir = self.policy.directory_for(now);
        fs::create_dir_all(&dir).map_err(|e| LoggerError::directory_create(&dir, e))?;

        let path = self.policy.file_path_for(now);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LoggerError::file_open(&path, e))?;

        let previous = std::mem::replace(
            &mut self.sink,
            OutputSink::File {
                path,
                writer: BufWriter::new(file),
            },
        );
        self.last_rotation = Some(HourKey::of(now));

        // Flush and close the outgoing file
        if let OutputSink::File { path, mut writer } = previous {
            if let Err(e) = writer.flush() {
                return Ok(Rotation::RotatedFlushFailed(LoggerError::io_operation(
                    "rotating log file",
                    format!("Failed to flush '{}'", path.display()),
                    e,
                )));
            }
        }

        Ok(Rotation::Rotated)
    }

    /// Path of the file currently receiving lines, if one is open
    pub fn current_path(&self) -> Option<&Path> {
        match &self.sink {
            OutputSink::File { path, .. } => Some(path),
            OutputSink::Console(_) => None,
        }
    }

    /// Hour of the currently open file
    pub fn last_rotation(&self) -> Option<HourKey> {
        self.last_rotation
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }
}

impl Appender for HourlyFileAppender {
    fn append(&mut self, line: &str) -> Result<()> {
        match &mut self.sink {
            OutputSink::File { path, writer } => writer.write_all(line.as_bytes()).map_err(|e| {
                LoggerError::write_failed(path.display().to_string(), e)
            }),
            OutputSink::Console(stderr) => stderr
                .write_all(line.as_bytes())
                .map_err(|e| LoggerError::write_failed("stderr", e)),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match &mut self.sink {
            OutputSink::File { path, writer } => writer.flush().map_err(|e| {
                LoggerError::write_failed(path.display().to_string(), e)
            }),
            OutputSink::Console(stderr) => stderr
                .flush()
                .map_err(|e| LoggerError::write_failed("stderr", e)),
        }
    }

    fn name(&self) -> &str {
        "hourly_file"
    }
}

impl Drop for HourlyFileAppender {
    fn drop(&mut self) {
        // Best effort: the writer reports flush errors before it exits
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .unwrap()
    }

    #[test]
    fn test_policy_paths() {
        let policy = RotationPolicy::new("/logs");
        let now = at(2024, 1, 2, 3, 4, 5);
        assert_eq!(policy.directory_for(&now), PathBuf::from("/logs/2024-01-02"));
        assert_eq!(
            policy.file_path_for(&now),
            PathBuf::from("/logs/2024-01-02/20240102_03.log")
        );
    }

    #[test]
    fn test_needs_rotation_on_any_field_change() {
        let policy = RotationPolicy::new("/logs");
        let base = at(2024, 5, 6, 7, 30, 0);
        let last = Some(HourKey::of(&base));

        assert!(policy.needs_rotation(None, &base));
        assert!(!policy.needs_rotation(last, &at(2024, 5, 6, 7, 59, 59)));
        assert!(policy.needs_rotation(last, &at(2024, 5, 6, 8, 0, 0)));
        assert!(policy.needs_rotation(last, &at(2024, 5, 7, 7, 30, 0)));
        assert!(policy.needs_rotation(last, &at(2024, 6, 6, 7, 30, 0)));
        assert!(policy.needs_rotation(last, &at(2025, 5, 6, 7, 30, 0)));
    }

    #[test]
    fn test_console_fallback_before_first_rotation() {
        let dir = tempdir().unwrap();
        let appender = HourlyFileAppender::new(dir.path());
        assert!(appender.current_path().is_none());
        assert!(appender.last_rotation().is_none());
        // No I/O until the first rotation
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_rotation_across_hour_boundary() {
        let dir = tempdir().unwrap();
        let mut appender = HourlyFileAppender::new(dir.path());

        let before = at(2024, 1, 2, 13, 59, 59);
        assert!(matches!(appender.rotate_if_needed(&before).unwrap(), Rotation::Rotated));
        appender.append("first\n").unwrap();
        assert!(matches!(
            appender.rotate_if_needed(&at(2024, 1, 2, 13, 59, 59)).unwrap(),
            Rotation::Unchanged
        ));

        let after = at(2024, 1, 2, 14, 0, 1);
        assert!(matches!(appender.rotate_if_needed(&after).unwrap(), Rotation::Rotated));
        appender.append("second\n").unwrap();
        appender.flush().unwrap();

        let day = dir.path().join("2024-01-02");
        assert_eq!(fs::read_to_string(day.join("20240102_13.log")).unwrap(), "first\n");
        assert_eq!(fs::read_to_string(day.join("20240102_14.log")).unwrap(), "second\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_existing_file_is_appended() {
        let dir = tempdir().unwrap();
        let now = at(2024, 3, 4, 5, 6, 7);
        let path = RotationPolicy::new(dir.path()).file_path_for(&now);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "existing\n").unwrap();

        let mut appender = HourlyFileAppender::new(dir.path());
        appender.rotate_if_needed(&now).unwrap();
        appender.append("new\n").unwrap();
        appender.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "existing\nnew\n");
        assert_eq!(appender.current_path(), Some(path.as_path()));
    }

    #[test]
    fn test_failed_rotation_keeps_previous_file() {
        let dir = tempdir().unwrap();
        let mut appender = HourlyFileAppender::new(dir.path());

        let first = at(2024, 1, 2, 23, 10, 0);
        appender.rotate_if_needed(&first).unwrap();
        let first_path = appender.current_path().unwrap().to_path_buf();

        // A regular file where the next day's directory should go
        fs::write(dir.path().join("2024-01-03"), "blocker").unwrap();

        let next = at(2024, 1, 3, 0, 0, 1);
        let err = appender.rotate_if_needed(&next).unwrap_err();
        assert!(matches!(err, LoggerError::DirectoryCreate { .. }));
        assert!(err.is_filesystem());
        assert_eq!(appender.current_path(), Some(first_path.as_path()));
        assert_eq!(appender.last_rotation(), Some(HourKey::of(&first)));

        appender.append("still here\n").unwrap();
        appender.flush().unwrap();
        assert_eq!(fs::read_to_string(&first_path).unwrap(), "still here\n");

        // Retried on the next event once the obstacle is gone
        fs::remove_file(dir.path().join("2024-01-03")).unwrap();
        assert!(matches!(appender.rotate_if_needed(&next).unwrap(), Rotation::Rotated));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_outgoing_flush_failure_still_rotates() {
        let dir = tempdir().unwrap();
        let first = at(2024, 1, 2, 13, 30, 0);
        let full = RotationPolicy::new(dir.path()).file_path_for(&first);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        // Every write to /dev/full fails with ENOSPC once the buffer is flushed
        std::os::unix::fs::symlink("/dev/full", &full).unwrap();

        let mut appender = HourlyFileAppender::new(dir.path());
        assert!(matches!(appender.rotate_if_needed(&first).unwrap(), Rotation::Rotated));
        appender.append("buffered\n").unwrap();

        let next = at(2024, 1, 2, 14, 0, 0);
        let outcome = appender.rotate_if_needed(&next).unwrap();
        assert!(matches!(outcome, Rotation::RotatedFlushFailed(LoggerError::IoOperation { .. })));
        assert_eq!(appender.last_rotation(), Some(HourKey::of(&next)));
        assert_eq!(
            appender.current_path(),
            Some(RotationPolicy::new(dir.path()).file_path_for(&next).as_path())
        );
    }
}
