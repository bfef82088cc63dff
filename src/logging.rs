use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::domain::FilterError;

pub const LOG_FILE: &str = concat!(env!("CARGO_PKG_NAME"), ".log");

/// Sends all tracing output to a log file, the terminal belongs to the ui.
///
/// `level` overrides `RUST_LOG`; without either only warnings are logged.
pub fn init(log_path: Option<PathBuf>, level: Option<tracing::Level>) -> Result<(), FilterError> {
    let log_path = match log_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            path
        }
        None => std::env::current_dir()?.join(LOG_FILE),
    };

    let env_filter = env_filter(level);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let file_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(Mutex::new(file))
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| FilterError::Logging(e.to_string()))
}

fn env_filter(level: Option<tracing::Level>) -> EnvFilter {
    match level {
        // An empty directive list leaves only the default, RUST_LOG is not read
        Some(lvl) => EnvFilter::builder()
            .with_default_directive(lvl.into())
            .parse_lossy(""),
        None => EnvFilter::builder()
            .with_default_directive(tracing::Level::WARN.into())
            .from_env_lossy(),
    }
}
