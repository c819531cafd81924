//! Diagnostic logging to a file.
//!
//! The TUI owns the terminal, so log lines go to `netgpt.log` in the
//! platform's local data directory instead of stderr.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable overriding the log filter, e.g. `NETGPT_LOG=netgpt=trace`
pub const LOG_ENV: &str = "NETGPT_LOG";

pub fn log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(crate::config::APP_DIR).join("netgpt.log"))
}

fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn open_log(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. Returns the log file path, or `None` when
/// no log file could be opened (logging is then disabled).
pub fn init(verbosity: u8) -> Option<PathBuf> {
    let path = log_path()?;
    let file = open_log(&path).ok()?;

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level(verbosity)));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init()
        .ok()?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "logging initialized");
    Some(path)
}
