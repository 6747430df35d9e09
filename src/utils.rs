//! File system and logging helpers.
//!
//! - Output directory validation before anything is written
//! - Tracing setup with a console layer and a plain-text run log

use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use std::sync::Mutex;
use tokio::fs;
use tracing::{info, instrument, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

/// Name of the human-readable run log inside the crawler output directory.
pub const LOG_FILENAME: &str = "custom.log";

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join(PROBE_FILENAME);
    fs::File::create(&probe_path).await?;
    remove_probe(&probe_path).await;
    info!("Output directory is writable");
    Ok(())
}

const PROBE_FILENAME: &str = "..__probe_write__";

/// Delete the write probe, logging instead of failing when it cannot be removed.
///
/// Returns `true` when the file was removed.
async fn remove_probe(probe_path: &Path) -> bool {
    match fs::remove_file(probe_path).await {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %probe_path.display(), error = %e, "Could not remove write probe");
            false
        }
    }
}

/// Install the global subscriber: console output plus an appended log file.
///
/// `RUST_LOG` overrides the default `info` level for both layers.
pub fn init_tracing(log_path: &Path) -> Result<(), Box<dyn Error>> {
    let log_file = stdfs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = tfmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(UtcTime::rfc_3339());
    let run_log = tfmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(run_log)
        .try_init()?;
    Ok(())
}
