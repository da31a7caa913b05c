use std::fs;
use std::path::Path;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_LOG_LEVEL: &str = "info";
const ENV_VAR_NAME: &str = "PTB_LOG";

/// Initialize the global tracing subscriber.
///
/// Output goes to the log file only (appending, JSON lines) — the terminal
/// is in raw mode for the whole run, so stderr is not usable as a sink.
/// The filter is resolved from `PTB_LOG`, falling back to `info`.
pub(crate) fn init(log_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = open_log_file(log_path)?;
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_target(false)
        .with_ansi(false)
        .json();

    tracing_subscriber::registry()
        .with(file_layer.with_filter(build_filter()))
        .try_init()?;
    Ok(())
}

fn build_filter() -> EnvFilter {
    EnvFilter::try_from_env(ENV_VAR_NAME).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

fn open_log_file(path: &Path) -> std::io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::OpenOptions::new().create(true).append(true).open(path)
}
