//! Tracing setup and the session log file

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create session log: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Temporary `ghc_*.log` file receiving every event of the run
pub struct SessionLog {
    file: NamedTempFile,
}

impl SessionLog {
    pub fn create() -> Result<Self, LoggingError> {
        let file = tempfile::Builder::new()
            .prefix("ghc_")
            .suffix(".log")
            .tempfile()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    fn writer(&self) -> Result<File, LoggingError> {
        Ok(self.file.as_file().try_clone()?)
    }
}

/// Installs the global subscriber.
///
/// Stderr shows `RUST_LOG` events (default `warn`) so stdout stays reserved
/// for check progress; the session log gets everything at `debug` and above.
pub fn init(log: &SessionLog) -> Result<(), LoggingError> {
    let stderr_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(log.writer()?))
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}
