//! File logging
//!
//! The terminal UI owns stdout, so log lines go to `scrabbot.log` in the
//! per-user data directory.

use directories::ProjectDirs;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "scrabbot.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("could not determine the data directory")]
    NoDataDirectory,
    #[error("failed to open the log file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to install the log subscriber: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Path of the log file, creating its directory if needed.
pub fn log_path() -> Result<PathBuf, LoggingError> {
    let dirs = ProjectDirs::from("", "", "scrabbot").ok_or(LoggingError::NoDataDirectory)?;
    let dir = dirs.data_dir();
    fs::create_dir_all(dir)?;
    Ok(dir.join(LOG_FILE))
}

/// Log to the file under the data directory. `RUST_LOG` wins over `default_level`.
pub fn init(default_level: &str) -> Result<PathBuf, LoggingError> {
    let path = log_path()?;
    let file = File::create(&path)?;
    install(Arc::new(file), default_level)?;
    Ok(path)
}

/// Install the global subscriber writing to `writer`. Fails if one is already set.
fn install<W>(writer: W, default_level: &str) -> Result<(), LoggingError>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(LoggingError::Subscriber)
}
