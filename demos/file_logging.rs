//! File logging example
//!
//! Starts a logger under `./log`, logs from a few worker threads through an
//! injected `Arc<dyn LeveledLog>`, then shuts down and prints where the lines
//! went.
//!
//! Run with: cargo run --example file_logging

use hourly_logger::prelude::*;
use hourly_logger::{debug, info, warn};
use std::sync::Arc;
use std::thread;

fn process_batch(log: &dyn LeveledLog, worker: usize) {
    for item in 1..=3 {
        log.infof(format_args!("worker {} processed item {}/3", worker, item));
    }
    if worker == 2 {
        log.warn("worker 2 took longer than expected");
    }
}

fn main() -> Result<()> {
    println!("=== Hourly Logger - File Logging Example ===\n");

    let logger = Arc::new(Logger::builder("./log").level(LogLevel::Debug).build()?);
    logger.init()?;

    info!(logger, "Application started");
    debug!(logger, "Loading configuration from {}", "./config.json");
    warn!(logger, "Using default settings for {} options", 2);

    let workers: Vec<_> = (1..=3)
        .map(|worker| {
            let log: Arc<dyn LeveledLog> = logger.clone();
            thread::spawn(move || process_batch(log.as_ref(), worker))
        })
        .collect();
    for worker in workers {
        if worker.join().is_err() {
            logger.error("a worker thread panicked");
        }
    }

    logger.info("All operations completed");

    // Blocks until every accepted line is on disk
    logger.uninit()?;

    let metrics = logger.metrics();
    println!(
        "\n{} lines written, {} files opened, {} write failures",
        metrics.written(),
        metrics.rotations(),
        metrics.write_failures()
    );
    println!("Check '{}' for the hourly log files", logger.directory_prefix().display());

    Ok(())
}
