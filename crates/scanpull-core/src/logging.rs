//! Logging setup: one file per day under the log dir, every line also echoed
//! to stdout. When the file cannot be opened the caller falls back to stderr.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::context::DATE_FORMAT;

const DEFAULT_FILTER: &str = "info,scanpull=debug,scanpull_core=debug";

/// Log file for a given day: `{log_dir}/{YYYY-MM-DD}.log`.
pub fn log_file_path(log_dir: &Path, date_label: &str) -> PathBuf {
    log_dir.join(format!("{}.log", date_label))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Hands out one writer per event, each teeing to the current day's file and
/// stdout. The file is reopened whenever the clock reports a new date, so a
/// long-running `daily` process still writes one file per day.
struct DailyTee {
    log_dir: PathBuf,
    today: Clock,
    current: Mutex<Option<(NaiveDate, File)>>,
}

impl DailyTee {
    fn new(log_dir: PathBuf, today: Clock) -> Self {
        Self {
            log_dir,
            today,
            current: Mutex::new(None),
        }
    }

    fn open(&self, date: NaiveDate) -> io::Result<File> {
        let label = date.format(DATE_FORMAT).to_string();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path(&self.log_dir, &label))
    }

    /// Handle to today's file, opening it on the first event of a new day.
    /// None if it cannot be opened; the event then only reaches stdout.
    fn file_for_today(&self) -> Option<File> {
        let date = (self.today)();
        let mut current = self.current.lock().ok()?;
        let stale = !matches!(&*current, Some((d, _)) if *d == date);
        if stale {
            *current = self.open(date).ok().map(|f| (date, f));
        }
        current.as_ref().and_then(|(_, f)| f.try_clone().ok())
    }
}

/// Per-event writer.
struct TeeWriter {
    file: Option<File>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(f) = self.file.as_mut() {
            f.write_all(buf)?;
        }
        io::stdout().lock().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(f) = self.file.as_mut() {
            f.flush()?;
        }
        io::stdout().lock().flush()
    }
}

impl<'a> MakeWriter<'a> for DailyTee {
    type Writer = TeeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        TeeWriter {
            file: self.file_for_today(),
        }
    }
}

/// Log to `{log_dir}/{date}.log` (appending, one file per local date) and
/// stdout.
///
/// Errors if the directory or today's file cannot be created, or a
/// subscriber is already installed; the caller then uses
/// [`init_logging_stderr`].
pub fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("create log dir {}", log_dir.display()))?;

    let tee = DailyTee::new(
        log_dir.to_path_buf(),
        Box::new(|| chrono::Local::now().date_naive()),
    );
    let today = (tee.today)();
    let file = tee.open(today).with_context(|| {
        format!(
            "open log file {}",
            log_file_path(log_dir, &today.format(DATE_FORMAT).to_string()).display()
        )
    })?;
    if let Ok(mut current) = tee.current.lock() {
        *current = Some((today, file));
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(tee)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logging already initialized: {}", e))?;

    tracing::debug!("logging to {}", log_dir.display());
    Ok(())
}

/// Stderr-only logging. Never fails; a second call is a no-op.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
