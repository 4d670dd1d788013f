//! relief - Disaster alert operator console
//!
//! A terminal console that polls the relief backend for alerts, estimates
//! their risk, requests response plans and tails the coordinator log.
//!
//! ## Usage
//!
//! ```bash
//! # Start the console against http://localhost:8000
//! relief
//!
//! # Point at another backend
//! relief --api-base http://10.0.0.5:8000
//!
//! # With verbose logging and a custom log directory
//! relief -v --log-dir /path/to/logs/
//!
//! # Explicit config file
//! relief --config ./relief.yaml
//! ```

use std::io::Write;
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use relief_core::{ConsoleConfig, LogGuard, init_logging};
use relief_tui::App;
use tracing::{error, info};

/// Relief operator console
///
/// Live alert feed with risk estimates, a map of located alerts, on-demand
/// response plans and the coordinator log stream.
#[derive(Parser, Debug)]
#[command(name = "relief")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.relief/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Backend base URL (overrides config file and RELIEF_API_BASE)
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Configuration file (defaults to ~/.relief/config.yaml if present)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    let config = match ConsoleConfig::resolve(cli.config.as_deref(), cli.api_base.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("Error: {}", e);
            if let Some(hint) = e.guidance() {
                eprintln!("{}", hint);
            }
            let code = if e.is_config_error() { 2 } else { 1 };
            return ExitCode::from(code);
        }
    };

    // Install panic hook to ensure terminal cleanup
    install_panic_hook();

    info!(api_base_url = %config.api_base_url, "Starting relief console");

    match run_app(&config) {
        Ok(()) => {
            info!("relief console exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("relief console error: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Install a panic hook that restores the terminal before printing the panic message.
fn install_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

/// Restore terminal to its normal state.
fn restore_terminal() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();

    let _ = crossterm::terminal::disable_raw_mode();
    crossterm::execute!(
        stdout,
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    crossterm::execute!(stdout, crossterm::cursor::Show)?;
    stdout.flush()?;

    Ok(())
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> relief_core::Result<LogGuard> {
    init_logging(cli.log_dir.clone(), cli.verbose > 0)
}

/// Run the TUI application.
fn run_app(config: &ConsoleConfig) -> relief_tui::AppResult<()> {
    let mut app = App::new(config)?;
    app.run()
}
