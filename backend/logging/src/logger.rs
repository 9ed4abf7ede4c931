//! Structured Logger
//!
//! Wraps `tracing` with pretty or JSON console output, optional daily-rolling
//! NDJSON files, and `RUST_LOG`-driven level control.

use std::path::Path;

use imageguard_config::{LogFormat, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Keeps the file writer flushing until dropped. Hold it for the process lifetime.
pub struct LoggerGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize the global subscriber. Calling it twice is harmless; the second call is a no-op.
pub fn init_logger(config: &LoggingConfig) -> LoggerGuard {
    let level = config.level.as_deref().unwrap_or("info");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = match config.format.unwrap_or_default() {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
            .boxed(),
    };

    let (file_layer, file_guard) = match config.dir.as_deref() {
        Some(dir) => {
            // Writes NDJSON to `<dir>/imageguard.log.YYYY-MM-DD`
            let appender =
                RollingFileAppender::new(Rotation::DAILY, Path::new(dir), "imageguard.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer).with_ansi(false).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    LoggerGuard { _file: file_guard }
}
