//! Logging initialization.
//!
//! Stderr output is always on. Commands that work on a chat snapshot also
//! write JSON logs to `.parlor/logs/<slug>/prompt.<YYYY-MM-DD>.log`, rotated
//! daily, so the debug-level prompt and token records can be inspected
//! later.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Daily log files kept per slug before the oldest is deleted.
const LOG_RETENTION_FILES: usize = 3;

const LOG_FILE_PREFIX: &str = "prompt";
const LOG_FILE_SUFFIX: &str = "log";

/// Initialize the tracing subscriber with stderr output.
///
/// When `slug` is `Some`, a JSON file layer is added as well. The returned
/// [`WorkerGuard`] must be held for the lifetime of the program so that
/// buffered file logs are flushed.
///
/// # Errors
///
/// Returns an error if the log directory or file cannot be created.
pub fn init_tracing(work_dir: &Path, slug: Option<&str>) -> Result<Option<WorkerGuard>> {
    let Some(slug) = slug else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(EnvFilter::from_default_env())
            .init();
        return Ok(None);
    };

    let (non_blocking, guard) = open_log_writer(work_dir, slug)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();

    Ok(Some(guard))
}

/// Directory holding the log files for `slug`.
fn log_dir(work_dir: &Path, slug: &str) -> PathBuf {
    work_dir.join(".parlor").join("logs").join(slug)
}

/// Create the log directory and a daily rolling appender inside it,
/// returning a non-blocking writer and its guard.
fn open_log_writer(work_dir: &Path, slug: &str) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = log_dir(work_dir, slug);

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(LOG_RETENTION_FILES)
        .build(&dir)
        .with_context(|| format!("failed to open log file in {}", dir.display()))?;

    Ok(tracing_appender::non_blocking(appender))
}
