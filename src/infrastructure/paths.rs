//! Filesystem location management for the default persistence backend.
//!
//! This module resolves the base directory where the JSON file backend keeps
//! its per-store entries. Hosts embedding the store can bypass all of this by
//! injecting their own backend; the resolution here only serves the
//! zero-configuration path.

use std::path::PathBuf;

/// Environment variable overriding the data directory outright.
const DATA_DIR_ENV: &str = "CRUDSTORE_DATA_DIR";

/// Returns the data directory for crudstore persistence files.
///
/// Resolution order:
///
/// 1. `CRUDSTORE_DATA_DIR` environment variable, taken verbatim
/// 2. `$XDG_DATA_HOME/crudstore` when `XDG_DATA_HOME` is set and non-empty
/// 3. `$HOME/.local/share/crudstore`
///
/// Falls back to a relative `.crudstore` directory when no home directory can
/// be determined, which keeps construction infallible on minimal
/// environments.
///
/// The directory is not created here; the JSON backend creates it on first
/// write.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg).join("crudstore");
        }
    }

    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("crudstore"),
        _ => PathBuf::from(".crudstore"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_wins() {
        // Only test in the crate touching this variable.
        std::env::set_var(DATA_DIR_ENV, "/tmp/crudstore-test-data");
        assert_eq!(data_dir(), PathBuf::from("/tmp/crudstore-test-data"));
        std::env::remove_var(DATA_DIR_ENV);
    }

    #[test]
    fn default_path_ends_with_crate_directory() {
        let dir = data_dir();
        assert!(dir.to_string_lossy().contains("crudstore"));
    }
}
