//! Logging setup.
//!
//! Installs a global `tracing` subscriber with an stderr layer and, when a
//! directory is configured, a daily rolling log file written off-thread.
//! `RUST_LOG` takes precedence over the configured level.
//!
//! ```ignore
//! let config = ConfigFile::load()?;
//! let _guard = compassmap::logging::init_logging(&config.logging)?;
//! tracing::info!("started");
//! ```

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingSettings;

/// File name prefix for rolling log files.
pub const LOG_FILE_PREFIX: &str = "compassmap.log";

/// Errors installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log filter '{directive}': {reason}")]
    Filter { directive: String, reason: String },

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Keeps the file writer alive. Dropping it flushes pending log lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// Whether log lines are also written to a file.
    pub fn writes_file(&self) -> bool {
        self.file_guard.is_some()
    }
}

/// Build the level filter: `RUST_LOG` if set and valid, else `level`.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    parse_filter(level)
}

fn parse_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|e| LoggingError::Filter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber.
///
/// Hold the returned guard for the life of the process.
pub fn init_logging(settings: &LoggingSettings) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(&settings.level)?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, file_guard) = match &settings.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::Io {
                path: dir.clone(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTime::rfc_3339());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(
        level = %settings.level,
        directory = ?settings.directory,
        "Logging initialized"
    );

    Ok(LoggingGuard { file_guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_accepts_levels_and_targets() {
        assert!(parse_filter("debug").is_ok());
        assert!(parse_filter("compassmap=trace,warn").is_ok());
    }

    #[test]
    fn test_filter_error_names_directive() {
        let err = LoggingError::Filter {
            directive: "bogus=".to_string(),
            reason: "invalid".to_string(),
        };
        assert!(err.to_string().contains("bogus="));
    }

    #[test]
    fn test_init_with_directory_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let settings = LoggingSettings {
            level: "info".to_string(),
            directory: Some(log_dir.clone()),
        };

        // Only this test installs the global subscriber
        let guard = init_logging(&settings).unwrap();
        assert!(guard.writes_file());
        assert!(log_dir.is_dir());

        let again = init_logging(&LoggingSettings::default());
        assert!(matches!(again, Err(LoggingError::AlreadyInitialized(_))));
    }
}
