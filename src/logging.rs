//! Logging setup for the command-line tool
//!
//! - Filter from `RUST_LOG`, otherwise `warn` (or `debug` with `--verbose`)
//! - stderr output for the batch commands, so stdout stays clean for
//!   instrumented code and JSON
//! - in the terminal viewer, a daily-rolling file under the temp directory
//!   instead, since stderr writes would corrupt the screen

use eyre::Result;
use std::{env, fs, path::PathBuf};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_DIR_NAME: &str = "trace-context-logs";

/// Install the global subscriber.
///
/// Returns the file writer's guard in viewer mode; keep it alive until exit
/// or buffered lines are lost.
pub fn init_logging(verbose: bool, tui_mode: bool) -> Result<Option<WorkerGuard>> {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| eyre::eyre!("Failed to create environment filter: {}", e))?;

    if tui_mode {
        let log_dir = create_log_directory()?;
        let file_appender = rolling::daily(&log_dir, "trace-context.log");
        let (writer, guard) = non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_writer(writer),
            )
            .try_init()
            .map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {}", e))?;

        tracing::info!(log_dir = %log_dir.display(), "logging to file");
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {}", e))?;
        Ok(None)
    }
}

/// Log directory in the system temp folder
fn create_log_directory() -> Result<PathBuf> {
    let log_dir = env::temp_dir().join(LOG_DIR_NAME);
    fs::create_dir_all(&log_dir)?;
    Ok(log_dir)
}
