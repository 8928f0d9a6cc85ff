//! PNG → CSV migration tool
//!
//! Command-line entry point. Validates arguments, sets up logging, and runs
//! one conversion.

use anyhow::Result;
use clap::Parser;
use std::fs::{self, File, OpenOptions};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::error;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use png_to_csv::cli::Args;
use png_to_csv::{paths, pipeline};

const LOG_FILE_NAME: &str = "png_to_csv.log";
const TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";

fn main() -> ExitCode {
    // Log panics through tracing so they also reach the log file
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        error!("[PANIC]{} {}", location, msg);
    }));

    let args = Args::parse();

    // Argument errors are reported before anything touches the filesystem
    let run = match args.resolve() {
        Ok(run) => run,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging() {
        eprintln!("warning: logging setup failed: {e:#}");
    }

    match pipeline::run(&run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs to stderr and to `logs/png_to_csv.log` next to the executable.
///
/// The file sink is skipped when the log file cannot be opened.
fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("png_to_csv=info"));

    let stderr_layer = fmt::layer()
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = open_log_file().map(|file| {
        fmt::layer()
            .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

fn open_log_file() -> Option<File> {
    let logs_dir = paths::get_logs_dir();
    fs::create_dir_all(&logs_dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(logs_dir.join(LOG_FILE_NAME))
        .ok()
}
