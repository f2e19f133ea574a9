use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{GeoFixError, Result};

/// Initializes the logging system with both console and file output.
///
/// A non-empty `RUST_LOG` replaces the configured directive entirely.
/// The returned guard must be kept alive for the file writer to flush.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_env_filter(rust_log.as_deref(), &config.default_directive)?;

    fs::create_dir_all(&config.directory)?;

    // Daily rotated JSON file next to human-readable console output
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_name);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| GeoFixError::Config(format!("Logging already initialized: {}", e)))?;

    Ok(guard)
}

/// Filter from `rust_log` when it is set, otherwise from the configured directive
pub fn build_env_filter(rust_log: Option<&str>, default_directive: &str) -> Result<EnvFilter> {
    let (source, directives) = match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => (EnvFilter::DEFAULT_ENV, value),
        None => ("logging.default_directive", default_directive),
    };

    EnvFilter::try_new(directives)
        .map_err(|e| GeoFixError::Config(format!("Invalid log directive in {} '{}': {}", source, directives, e)))
}
