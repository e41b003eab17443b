use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Route diagnostics to a file so they never draw over the terminal UI.
///
/// `RUST_LOG` takes precedence over `level` when set. The returned guard must be
/// held until exit or buffered lines are lost.
pub fn init(log_file: &str, level: &str) -> Result<WorkerGuard> {
    let path = Path::new(log_file);
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid log file '{log_file}'"))?;

    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create {}", directory.display()))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("ebook_term={level},ebook_client={level}")))
        .context("Invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to initialize logging: {err}"))?;

    return Ok(guard);
}
