use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingConfig, LOG_ENV_VAR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Batch commands: stderr, or the configured file.
    Stderr,
    /// The terminal is the drawing surface: file if configured, else nothing.
    FileOnly,
}

/// Builds the level filter: `ASCIIPLAY_LOG` wins over the configured level.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let directive = std::env::var(LOG_ENV_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.level.clone());
    EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter '{directive}'"))
}

/// Installs the global subscriber. Returns `false` when logging stays off.
pub fn init_logging(config: &LoggingConfig, target: LogTarget) -> Result<bool> {
    let filter = build_filter(config)?;

    let log_file = config
        .file
        .as_deref()
        .filter(|path| !path.as_os_str().is_empty());
    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
        return Ok(true);
    }

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
            Ok(true)
        }
        LogTarget::FileOnly => Ok(false),
    }
}
