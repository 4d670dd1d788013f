//! Logging infrastructure for the relief console.
//!
//! Structured logging through the `tracing` ecosystem. The terminal UI owns
//! stdout/stderr while it runs, so diagnostics go to a JSON lines file instead
//! of the console.
//!
//! ## Features
//!
//! - JSON lines format for machine parsing
//! - File output to `~/.relief/logs/relief.log` (daily rotation)
//! - `-v` flag support for verbose logging
//! - `RUST_LOG` overrides the default filter
//!
//! ## Example
//!
//! ```no_run
//! use relief_core::logging;
//!
//! let _guard = logging::init_logging(None, false).expect("logging init");
//!
//! tracing::info!("console started");
//! tracing::debug!(alert_id = "A1", "requesting plan");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{ReliefError, Result};

/// Guard that must be held to ensure log flushing on shutdown.
///
/// Keep this guard alive for the lifetime of the application.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the console logging system.
///
/// # Arguments
///
/// * `log_dir` - Optional custom log directory. Defaults to `~/.relief/logs/`
/// * `verbose` - If true, sets log level to DEBUG. Otherwise uses INFO.
///
/// # Returns
///
/// A [`LogGuard`] that must be held for the application lifetime.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| ReliefError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "relief.log");
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "relief={default_level},relief_core={default_level},relief_api={default_level},relief_tui={default_level}"
        ))
    });

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| ReliefError::internal(format!("logging already initialized: {e}")))?;

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Initialize minimal console-only logging for testing.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Get the default log directory path.
///
/// Returns `~/.relief/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(crate::config::relief_home()?.join("logs"))
}

/// Get the default log file path.
///
/// Returns `~/.relief/logs/relief.log`
pub fn default_log_file() -> Result<PathBuf> {
    Ok(default_log_dir()?.join("relief.log"))
}

/// Log the outcome of one poll cycle.
///
/// # Example
///
/// ```ignore
/// log_poll_event!("alerts", "success", count = 4);
/// log_poll_event!("logs", "failure", error = %err);
/// ```
#[macro_export]
macro_rules! log_poll_event {
    ($feed:expr, $outcome:expr) => {
        tracing::info!(
            target: "relief::poll",
            feed = $feed,
            outcome = $outcome,
            "poll cycle"
        )
    };
    ($feed:expr, $outcome:expr, $($field:tt)*) => {
        tracing::info!(
            target: "relief::poll",
            feed = $feed,
            outcome = $outcome,
            $($field)*,
            "poll cycle"
        )
    };
}

/// Log a plan request lifecycle event.
///
/// # Example
///
/// ```ignore
/// log_plan_event!("A1", "issued", seq = 3);
/// log_plan_event!("A1", "rejected", reason = "invalid response");
/// ```
#[macro_export]
macro_rules! log_plan_event {
    ($alert_id:expr, $event:expr) => {
        tracing::info!(
            target: "relief::plan",
            alert_id = $alert_id,
            event = $event,
            "plan event"
        )
    };
    ($alert_id:expr, $event:expr, $($field:tt)*) => {
        tracing::info!(
            target: "relief::plan",
            alert_id = $alert_id,
            event = $event,
            $($field)*,
            "plan event"
        )
    };
}
