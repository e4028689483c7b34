//! Tracing initialization and subscriber setup.
//!
//! This module configures a `tracing` subscriber for hosts that do not bring
//! their own. Libraries embedding crudstore inside a larger application
//! should skip this entirely; the store only ever emits through the
//! `tracing` macros and composes with whatever subscriber the host installs.

use crate::infrastructure::paths;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name of the diagnostic log inside the data directory.
const LOG_FILE_NAME: &str = "crudstore.log";

/// Initializes a human-readable tracing subscriber on standard error.
///
/// # Level Resolution
///
/// 1. `RUST_LOG` environment variable (highest priority)
/// 2. The `level` argument, e.g. `Some("debug")`
/// 3. Default: `"info"`
///
/// # Initialization Behavior
///
/// Idempotent: safe to call multiple times, only the first call takes
/// effect. Does nothing when another subscriber is already installed.
///
/// # Example
///
/// ```
/// crudstore::observability::init_tracing(Some("debug"));
///
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(level: Option<&str>) {
    let filter = env_filter(level);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false));

    let _ = subscriber.try_init();
}

/// Initializes a tracing subscriber appending to a log file.
///
/// The file lives at `{data_dir}/crudstore.log`, next to the JSON
/// persistence entries. Level resolution matches [`init_tracing`].
///
/// # Initialization Behavior
///
/// - Creates the data directory if it doesn't exist
/// - Silently does nothing if the directory or file cannot be created
///   (diagnostics are optional, the store works without them)
/// - Idempotent: safe to call multiple times
pub fn init_tracing_to_file(level: Option<&str>) {
    let data_dir = paths::data_dir();
    if std::fs::create_dir_all(&data_dir).is_err() {
        return;
    }

    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE_NAME))
    else {
        return;
    };

    let subscriber = tracing_subscriber::registry().with(env_filter(level)).with(
        tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false),
    );

    let _ = subscriber.try_init();
}

fn env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("info")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_tracing(Some("debug"));
        init_tracing(Some("trace"));
        tracing::debug!("still alive after double init");
    }
}
