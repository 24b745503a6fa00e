//! Logging infrastructure for Scene Sync.
//!
//! This module provides:
//! - Per-session loggers with file + callback output
//! - Compact mode with progress filtering
//! - Tail buffer of external tool output for error diagnosis
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use scenesync_core::logging::{LogConfig, SessionLogger};
//!
//! let logger = SessionLogger::new("movie", ".logs", LogConfig::default(), None).unwrap();
//!
//! logger.phase("Fingerprint");
//! logger.command("ffmpeg -i input.mkv ...");
//! logger.progress(50);
//! logger.success("Session completed");
//! ```

mod session_logger;
mod types;

pub use session_logger::{sanitize_filename, SessionLogger, SessionLoggerBuilder};
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()))
}

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`, falling back to `default_level`, and writes to
/// stderr. Call once at startup.
pub fn init_tracing(default_level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .with(env_filter(default_level))
        .init();
}

/// Like `init_tracing`, plus a non-blocking copy of every event in
/// `<log_dir>/<file_name>`.
///
/// Keep the returned guard alive until exit, or buffered lines are lost.
pub fn init_tracing_with_file(
    default_level: LogLevel,
    log_dir: &Path,
    file_name: &str,
) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::never(log_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter(default_level))
        .init();

    Ok(guard)
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_filter_strings() {
        assert_eq!(LogLevel::Debug.as_filter_str(), "debug");
        assert_eq!(LogLevel::Info.as_filter_str(), "info");
        assert_eq!(LogLevel::Warn.to_tracing_level(), tracing::Level::WARN);
    }
}
