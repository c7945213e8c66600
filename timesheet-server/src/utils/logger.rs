//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments.

use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None, None);
}

/// Initialize the logger with optional JSON stdout and daily rolling file output
///
/// `log_level` accepts any `EnvFilter` directive (`info`, `timesheet_server=debug,sqlx=warn`).
/// The file layer is only added when `log_dir` already exists.
pub fn init_logger_with_file(log_level: Option<&str>, json: Option<bool>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let json = json.unwrap_or(false);

    let stdout_plain = (!json).then(|| fmt::layer().with_target(false));
    let stdout_json = json.then(|| fmt::layer().json());

    let file_layer = log_dir
        .map(Path::new)
        .filter(|p| p.exists())
        .map(|dir| {
            let appender = tracing_appender::rolling::daily(dir, "timesheet-server");
            fmt::layer().with_ansi(false).with_writer(appender)
        });

    // A second init (tests, embedded use) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stdout_plain)
        .with(stdout_json)
        .with(file_layer)
        .try_init();
}
