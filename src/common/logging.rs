//! Logging and tracing configuration
//!
//! Console output of a run goes through the reporter; tracing carries the
//! diagnostic stream and can additionally be mirrored to a log file.

use std::path::PathBuf;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use super::paths;

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("scenario=debug,info")
        } else {
            EnvFilter::new("scenario=info,warn")
        }
    })
}

/// Initialize tracing for the CLI (stderr logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate, WARN for dependencies.
pub fn init_cli(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Initialize tracing to both stderr and the log file
///
/// Returns the log file path, or `None` when the file could not be opened,
/// in which case only stderr logging is installed.
pub fn init_with_file(verbose: bool) -> Option<PathBuf> {
    let log_file = match paths::ensure_log_dir() {
        Ok(Some(dir)) => dir.join(paths::LOG_FILE),
        Ok(None) => {
            init_cli(verbose);
            return None;
        }
        Err(e) => {
            eprintln!("Warning: Could not create log directory: {}", e);
            init_cli(verbose);
            return None;
        }
    };

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            init_cli(verbose);
            return None;
        }
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .compact();

    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Some(log_file)
}

/// Truncate the log file
pub fn truncate_log() -> std::io::Result<()> {
    if let Some(path) = paths::log_path() {
        if path.exists() {
            std::fs::write(&path, "")?;
        }
    }
    Ok(())
}
