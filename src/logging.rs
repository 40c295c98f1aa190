//! Tracing subscriber setup.
//!
//! Logs always go to stdout. When a log file is configured, the same events
//! are appended to it too (without ANSI colors). The level comes from
//! `RUST_LOG` and defaults to `info`.
//!
//! If the log file cannot be opened, logging continues on stdout only and
//! the failure is logged once the subscriber is up.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Call once, at startup.
pub fn init(log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let file = log_file.map(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
    });

    let (file_layer, open_error) = match file {
        Some(Ok(f)) => (
            Some(fmt::layer().with_ansi(false).with_writer(Arc::new(f))),
            None,
        ),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer())
        .with(file_layer)
        .try_init()?;

    if let (Some(path), Some(e)) = (log_file, open_error) {
        tracing::warn!("Failed to open log file {}: {e}", path.display());
    }
    Ok(())
}
