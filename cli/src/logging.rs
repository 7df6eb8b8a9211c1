//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/brokerlens/brokerlens.log` (or platform
//! equivalent) with 10 MB rotation. The REPL owns stdout, so console output
//! goes to stderr and only when `DEBUG_LOGGING` is set.

use std::path::PathBuf;

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        "info,brokerlens_core=debug,brokerlens_cli=debug"
    } else {
        "info"
    }
}

fn log_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join("brokerlens"))
}

/// Initialize logging.
///
/// Returns a `WorkerGuard` that must be held for the process lifetime so
/// buffered lines are flushed on exit. Returns `None` when the log file
/// cannot be opened; logging then goes to stderr only.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let Some(log_dir) = log_dir() else {
        init_stderr_only(debug_logging);
        return None;
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Subscriber not installed yet
        eprintln!("Failed to create log directory {log_dir:?}: {e}, using stderr only");
        init_stderr_only(debug_logging);
        return None;
    }

    // brokerlens.log plus one rotated file
    let log_path = log_dir.join("brokerlens.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(MAX_LOG_BYTES),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {log_path:?}: {e}");
            init_stderr_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let stderr_layer = debug_logging.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::NONE)
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(EnvFilter::new(filter_directive(debug_logging)))
        .init();

    tracing::info!(log_file = ?log_path, debug_logging, "brokerlens logging initialized");

    Some(guard)
}

fn init_stderr_only(debug_logging: bool) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(EnvFilter::new(filter_directive(debug_logging)))
        .init();

    tracing::info!(debug_logging, "brokerlens logging initialized (stderr only)");
}
