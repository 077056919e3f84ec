use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::errors::{Result, TemplateError};
use super::fs::ensure_dir;
use crate::constants::{DEFAULT_LOG_FILTER, LOG_DIR, LOG_FILE_NAME};

/// Initialize the logging system with the default log directory
pub fn init_logger() -> Result<()> {
    init_logger_in(LOG_DIR)
}

/// Initialize logging to stderr and to `<log_dir>/template.log`.
///
/// The level comes from `RUST_LOG` and defaults to `info`.
pub fn init_logger_in(log_dir: impl AsRef<Path>) -> Result<()> {
    let log_dir = log_dir.as_ref();
    ensure_dir(log_dir)?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE_NAME))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| TemplateError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_log_file() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs");

        // Another test may already have installed the global subscriber
        match init_logger_in(&log_dir) {
            Ok(()) | Err(TemplateError::Logging(_)) => {}
            Err(e) => panic!("unexpected logger error: {}", e),
        }

        assert!(log_dir.is_dir());
        assert!(log_dir.join(LOG_FILE_NAME).exists());
    }
}
