//! The single writer: formats queued events, rotates files and mirrors to console

use super::{
    appender::Appender,
    clock::Clock,
    error::{panic_message, LoggerError},
    event_pool::{EventHandle, EventPool},
    formatter::format_line,
    handoff::Consumer,
    metrics::LoggerMetrics,
    shutdown::CloseListener,
};
use crate::appenders::{HourlyFileAppender, Rotation};
use crossbeam_channel::select;
use std::sync::Arc;

/// Callback receiving every error the writer hits (rotation, writes, flushes)
pub type ErrorCallback = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// Default error channel: report on stderr
pub fn stderr_error_callback() -> ErrorCallback {
    Arc::new(|err: &LoggerError| eprintln!("[LOGGER ERROR] {}", err))
}

/// Initial capacity of the per-line scratch buffer
const SCRATCH_CAPACITY: usize = 256;

/// Sole consumer of the handoff queue.
///
/// Owns the file appender, the console mirror and the scratch buffer, so none
/// of them needs synchronization.
pub(crate) struct Writer {
    consumer: Consumer,
    pool: Arc<EventPool>,
    file: HourlyFileAppender,
    console: Box<dyn Appender>,
    clock: Box<dyn Clock>,
    scratch: String,
    metrics: Arc<LoggerMetrics>,
    on_error: ErrorCallback,
}

impl Writer {
    pub(crate) fn new(
        consumer: Consumer,
        pool: Arc<EventPool>,
        file: HourlyFileAppender,
        console: Box<dyn Appender>,
        clock: Box<dyn Clock>,
        metrics: Arc<LoggerMetrics>,
        on_error: ErrorCallback,
    ) -> Self {
        Self {
            consumer,
            pool,
            file,
            console,
            clock,
            scratch: String::with_capacity(SCRATCH_CAPACITY),
            metrics,
            on_error,
        }
    }

    /// Writer thread body: handle events until the close signal, then drain.
    pub(crate) fn run(mut self, close: CloseListener) {
        let events = self.consumer.receiver().clone();

        loop {
            select! {
                recv(events) -> msg => match msg {
                    Ok(handle) => self.process(handle),
                    // Every producer is gone; whatever is left is drained below
                    Err(_) => break,
                },
                recv(close.receiver()) -> _ => break,
            }
        }

        self.drain();
    }

    /// Write everything still queued, then flush both sinks.
    pub(crate) fn drain(&mut self) {
        while let Some(handle) = self.consumer.try_pop() {
            self.process(handle);
        }
        self.flush_all();
    }

    fn process(&mut self, handle: EventHandle) {
        let now = self.clock.now();

        self.scratch.clear();
        self.pool.with(&handle, |event| {
            #[cfg(debug_assertions)]
            debug_assert!(!event.is_stale(), "formatting a released event record");
            format_line(&mut self.scratch, &now, event);
        });
        self.pool.release(handle);

        match self.file.rotate_if_needed(&now) {
            Ok(Rotation::Unchanged) => {}
            Ok(Rotation::Rotated) => {
                self.metrics.record_rotation();
            }
            Ok(Rotation::RotatedFlushFailed(e)) => {
                self.metrics.record_rotation();
                self.metrics.record_write_failure();
                (self.on_error)(&e);
            }
            Err(e) => {
                self.metrics.record_rotation_failure();
                (self.on_error)(&e);
            }
        }

        let line = self.scratch.as_str();
        let file_result = self.file.append(line);
        let console_result = isolate(self.console.as_mut(), |console| console.append(line));

        for result in [file_result, console_result] {
            if let Err(e) = result {
                self.metrics.record_write_failure();
                (self.on_error)(&e);
            }
        }
        self.metrics.record_written();

        if self.consumer.is_empty() {
            self.flush_all();
        }
    }

    fn flush_all(&mut self) {
        let file_result = self.file.flush();
        let console_result = isolate(self.console.as_mut(), |console| console.flush());

        for result in [file_result, console_result] {
            if let Err(e) = result {
                (self.on_error)(&e);
            }
        }
    }
}

/// Run a sink operation, converting a panic into an error so one misbehaving
/// sink cannot take the writer thread down.
fn isolate<F>(appender: &mut dyn Appender, op: F) -> super::error::Result<()>
where
    F: FnOnce(&mut dyn Appender) -> super::error::Result<()>,
{
    let name = appender.name().to_string();
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| op(appender))) {
        Ok(result) => result,
        Err(payload) => Err(LoggerError::appender_panicked(
            name,
            panic_message(payload.as_ref()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::ConsoleAppender;
    use crate::core::error::Result;
    use crate::core::handoff;
    use crate::core::log_event::SourceLocation;
    use crate::core::log_level::LogLevel;
    use crate::core::shutdown::close_signal;
    use chrono::{NaiveDate, NaiveDateTime};
    use parking_lot::Mutex;
    use std::io::{self, Write};
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    struct Panicking;

    impl Appender for Panicking {
        fn append(&mut self, _line: &str) -> Result<()> {
            panic!("sink exploded");
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn fixed() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap()
    }

    struct Harness {
        pool: Arc<EventPool>,
        producer: handoff::Producer,
        metrics: Arc<LoggerMetrics>,
        errors: Arc<Mutex<Vec<String>>>,
    }

    impl Harness {
        fn enqueue(&self, content: &str) {
            let handle = self.pool.acquire().unwrap();
            self.pool.with(&handle, |event| {
                event.assign(LogLevel::Info, SourceLocation::new("x.go", 10), format_args!("{}", content))
            });
            self.producer.push(handle).unwrap();
        }
    }

    fn writer_with(prefix: &std::path::Path, console: Box<dyn Appender>) -> (Writer, Harness) {
        writer_with_clock(prefix, console, Box::new(fixed))
    }

    fn writer_with_clock(
        prefix: &std::path::Path,
        console: Box<dyn Appender>,
        clock: Box<dyn Clock>,
    ) -> (Writer, Harness) {
        let metrics = Arc::new(LoggerMetrics::new());
        let pool = Arc::new(EventPool::with_capacity(16));
        let (producer, consumer) = handoff::channel(handoff::validate_capacity(8).unwrap(), Arc::clone(&metrics));
        let errors = Arc::new(Mutex::new(Vec::new()));
        let errors_clone = Arc::clone(&errors);
        let on_error: ErrorCallback = Arc::new(move |e: &LoggerError| errors_clone.lock().push(e.to_string()));

        let writer = Writer::new(
            consumer,
            Arc::clone(&pool),
            HourlyFileAppender::new(prefix),
            console,
            clock,
            Arc::clone(&metrics),
            on_error,
        );
        (writer, Harness { pool, producer, metrics, errors })
    }

    #[test]
    fn test_drain_writes_file_and_console() {
        let dir = tempdir().unwrap();
        let console = Shared::default();
        let (mut writer, harness) =
            writer_with(dir.path(), Box::new(ConsoleAppender::with_writer(console.clone())));

        harness.enqueue("hello");
        harness.enqueue("world\n");
        writer.drain();

        let expected = "2024-01-02 03:04:05 [INFO] [x.go10] hello\n\
                        2024-01-02 03:04:05 [INFO] [x.go10] world\n";
        assert_eq!(console.text(), expected);
        let file = dir.path().join("2024-01-02").join("20240102_03.log");
        assert_eq!(std::fs::read_to_string(file).unwrap(), expected);

        assert_eq!(harness.metrics.written(), 2);
        assert_eq!(harness.metrics.rotations(), 1);
        assert_eq!(harness.pool.in_use(), 0);
    }

    #[test]
    fn test_run_drains_after_close() {
        let dir = tempdir().unwrap();
        let console = Shared::default();
        let (writer, harness) =
            writer_with(dir.path(), Box::new(ConsoleAppender::with_writer(console.clone())));
        let (signal, listener) = close_signal();

        for i in 0..5 {
            harness.enqueue(&format!("queued {}", i));
        }
        signal.raise();
        writer.run(listener);

        assert_eq!(console.text().lines().count(), 5);
        assert_eq!(harness.metrics.written(), 5);
    }

    #[test]
    fn test_panicking_console_is_isolated() {
        let dir = tempdir().unwrap();
        let (mut writer, harness) = writer_with(dir.path(), Box::new(Panicking));

        harness.enqueue("survives");
        writer.drain();

        let file = dir.path().join("2024-01-02").join("20240102_03.log");
        assert!(std::fs::read_to_string(file).unwrap().contains("survives"));
        assert_eq!(harness.metrics.write_failures(), 1);
        let errors = harness.errors.lock();
        assert!(errors.iter().any(|e| e.contains("panicking") && e.contains("sink exploded")));
    }

    #[test]
    fn test_rotation_failure_reported_and_line_mirrored() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();
        let console = Shared::default();
        let (mut writer, harness) =
            writer_with(&blocker, Box::new(ConsoleAppender::with_writer(console.clone())));

        harness.enqueue("nowhere to go");
        writer.drain();

        assert_eq!(harness.metrics.rotation_failures(), 1);
        assert_eq!(harness.metrics.written(), 1);
        assert!(console.text().contains("nowhere to go"));
        assert!(harness.errors.lock()[0].contains("Failed to create log directory"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_rotation_counted_when_outgoing_flush_fails() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let dir = tempdir().unwrap();
        let first = fixed();
        let second = first + chrono::Duration::hours(1);
        let first_path = crate::appenders::RotationPolicy::new(dir.path()).file_path_for(&first);
        std::fs::create_dir_all(first_path.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink("/dev/full", &first_path).unwrap();

        let calls = AtomicUsize::new(0);
        let clock = move || if calls.fetch_add(1, Ordering::SeqCst) == 0 { first } else { second };
        let (mut writer, harness) =
            writer_with_clock(dir.path(), Box::new(ConsoleAppender::with_writer(io::sink())), Box::new(clock));

        // Enqueue both before draining so the first line is still buffered at rotation
        harness.enqueue("lost to a full disk");
        harness.enqueue("next hour");
        writer.drain();

        assert_eq!(harness.metrics.rotations(), 2);
        assert_eq!(harness.metrics.rotation_failures(), 0);
        assert_eq!(harness.metrics.write_failures(), 1);
        assert!(harness.errors.lock()[0].contains("Failed to flush"));
        let second_path = dir.path().join("2024-01-02").join("20240102_04.log");
        assert!(std::fs::read_to_string(second_path).unwrap().contains("next hour"));
    }
}
