//! Logging system initialization
//!
//! Builds the global tracing subscriber from `LoggingConfig`.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::LoggingConfig;

/// Where log lines go
enum LogTarget {
    Stdout,
    Rolling { dir: String, prefix: String },
    File(String),
}

fn resolve_target(logging: &LoggingConfig) -> LogTarget {
    match logging.file.as_deref() {
        Some(file) if !file.is_empty() && logging.enable_rotation => {
            let path = std::path::Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|| ".".to_string());
            let prefix = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("linktrace.log")
                .trim_end_matches(".log")
                .to_string();
            LogTarget::Rolling { dir, prefix }
        }
        Some(file) if !file.is_empty() => LogTarget::File(file.to_string()),
        _ => LogTarget::Stdout,
    }
}

/// Initialize logging system based on configuration
///
/// Must be called once, after configuration is loaded. The returned
/// `WorkerGuard` has to stay alive for the lifetime of the program so
/// buffered lines are flushed on exit.
///
/// Falls back to stdout when the log file can't be opened.
pub fn init_logging(logging: &LoggingConfig) -> WorkerGuard {
    let writer: Box<dyn std::io::Write + Send + Sync> = match resolve_target(logging) {
        LogTarget::Rolling { dir, prefix } => match rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(prefix)
            .filename_suffix("log")
            .max_log_files(logging.max_backups as usize)
            .build(&dir)
        {
            Ok(appender) => Box::new(appender),
            Err(e) => {
                eprintln!("[WARN] Failed to create rolling log appender in {}: {}", dir, e);
                Box::new(std::io::stdout())
            }
        },
        LogTarget::File(path) => match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("[WARN] Failed to open log file {}: {}", path, e);
                Box::new(std::io::stdout())
            }
        },
        LogTarget::Stdout => Box::new(std::io::stdout()),
    };

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(logging.level.clone()));

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(logging.file.as_ref().is_none_or(|f| f.is_empty()));

    if logging.format == "json" {
        subscriber_builder.json().init();
    } else {
        subscriber_builder.init();
    }

    guard
}
