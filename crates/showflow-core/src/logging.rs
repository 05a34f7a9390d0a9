//! Logging setup.
//!
//! Installs a `tracing` subscriber writing to stderr (stdout belongs to the
//! renderer output). `RUST_LOG`, when set, wins over the configured level;
//! `verbose` raises the configured level to `debug`.

use std::fs::OpenOptions;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::LogConfig;

/// Keeps the background file writer alive. Drop it last.
#[must_use]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Picks the filter directive: `RUST_LOG`, then `--verbose`, then config.
fn filter_directive(config: &LogConfig, verbose: bool, rust_log: Option<String>) -> String {
    match rust_log {
        Some(value) if !value.trim().is_empty() => value,
        _ if verbose => "debug".to_string(),
        _ => config.level.clone(),
    }
}

pub fn init(config: &LogConfig, verbose: bool) -> Result<LogGuard> {
    let directive = filter_directive(config, verbose, std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{directive}'"))?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let (file_layer, file_guard) = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(LogGuard { _file: file_guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_wins() {
        let config = LogConfig::default();
        assert_eq!(
            filter_directive(&config, true, Some("showflow_core=trace".into())),
            "showflow_core=trace"
        );
    }

    #[test]
    fn test_verbose_raises_to_debug() {
        let config = LogConfig::default();
        assert_eq!(filter_directive(&config, true, None), "debug");
        assert_eq!(filter_directive(&config, false, Some("  ".into())), "info");
    }
}
