//! # sendchange-logging
//!
//! Tracing setup for the sendchange hook.
//!
//! Hook output reaches the pushing client through stderr, so that is where
//! log lines go. A log directory can be added for a daily rolling file that
//! outlives the push.
//!
//! ## Log Formats
//!
//! - `Pretty` - Human-readable output
//! - `Json` - Structured JSON lines
//! - `Compact` - Minimal text output

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to open log directory: {0}")]
    LogDir(#[from] tracing_appender::rolling::InitError),

    #[error("Failed to install tracing subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Keeps the log file writer alive; drop it at exit to flush
#[must_use]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize tracing for the process.
///
/// `RUST_LOG` overrides `level` when set.
pub fn init_tracing(
    level: &str,
    format: LogFormat,
    log_dir: Option<&Path>,
) -> Result<LogGuard, LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, file_guard) = match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("sendchange")
                .filename_suffix("log")
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer(format))
        .with(file_layer)
        .try_init()?;

    Ok(LogGuard { _file: file_guard })
}

fn stderr_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_pretty() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }
}
