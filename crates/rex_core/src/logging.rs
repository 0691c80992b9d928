use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::RexConfig;

const LOG_FILE_PREFIX: &str = "rex";

/// `RUST_LOG` wins; otherwise `level` (e.g. `info`, `rex_docs=trace`).
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Daily-rolling file log under `~/.rex/logs` plus compact console output on
/// stderr. Keep the returned guard alive for the life of the process.
pub fn init_logging(level: &str) -> Result<WorkerGuard> {
    install(&RexConfig::logs_dir()?, default_filter(level), true)
}

/// File-only logging into `logs_dir`. Used by one-shot commands whose stdout
/// is their output, and by tests.
pub fn init_logging_to_dir(logs_dir: &Path, level: &str) -> Result<WorkerGuard> {
    install(logs_dir, default_filter(level), false)
}

fn install(logs_dir: &Path, filter: EnvFilter, console: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory: {}", logs_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = console.then(|| {
        fmt::layer()
            .with_target(false)
            .compact()
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}
