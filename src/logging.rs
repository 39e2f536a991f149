//! Tracing subscriber setup.
//!
//! The terminal belongs to the UI, so everything goes to a log file.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{AppError, Result};

/// Install the global subscriber, appending to `log_file`.
///
/// `RUST_LOG` takes precedence over `default_level`.
pub fn init(log_file: &Path, default_level: &str) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(default_level)
            .map_err(|e| AppError::Logging(format!("bad log level '{}': {}", default_level, e)))
    })?;

    build_subscriber(file, filter)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

/// Build a subscriber that writes plain-text lines to `log_file`.
pub fn build_subscriber(log_file: File, filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync {
    let fmt_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry().with(fmt_layer).with(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn writes_enabled_levels_only() {
        let log = NamedTempFile::new().unwrap();
        let subscriber = build_subscriber(log.reopen().unwrap(), EnvFilter::new("info"));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("renamed something");
            tracing::debug!("noisy detail");
        });

        let contents = fs::read_to_string(log.path()).unwrap();
        assert!(contents.contains("INFO"));
        assert!(contents.contains("renamed something"));
        assert!(!contents.contains("noisy detail"));
    }

    #[test]
    fn debug_filter_includes_debug() {
        let log = NamedTempFile::new().unwrap();
        let subscriber = build_subscriber(log.reopen().unwrap(), EnvFilter::new("debug"));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("listing /tmp");
        });

        let contents = fs::read_to_string(log.path()).unwrap();
        assert!(contents.contains("listing /tmp"));
    }
}
