//! Logging infrastructure.
//!
//! This module provides:
//! - Per-run loggers with file + callback dual output
//! - Compact mode with a tail buffer for tool failures
//! - Process-wide `tracing` subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use vsa_core::logging::{LogConfig, RunLogger};
//!
//! let logger = RunLogger::new("story_01", "/path/to/logs", LogConfig::default(), None).unwrap();
//!
//! logger.phase("AssemblingAudio");
//! logger.command("ffmpeg -y -i hook.mp3 -i main.mp3 ...");
//! logger.success("Audio assembled");
//! ```

mod run_logger;
mod types;

pub use run_logger::{format_args_pretty, RunLogger};
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber (stderr only).
///
/// Respects `RUST_LOG`, falling back to `default_level`.
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(env_filter(default_level))
        .init();
}

/// Initialize tracing to stderr plus a daily-rolling file in `log_dir`.
///
/// Keep the returned guard alive for the life of the process, otherwise
/// buffered file output is lost.
pub fn init_tracing_with_file(default_level: LogLevel, log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, "vsa.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(env_filter(default_level))
        .init();

    guard
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()))
}
