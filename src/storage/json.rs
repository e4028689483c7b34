//! JSON file-based persistence backend.
//!
//! This module provides the default backend: one human-readable JSON file per
//! persisted key under a base directory. It uses atomic file writes
//! (write-to-temp + rename) to prevent corruption on crashes.
//!
//! # Performance Characteristics
//!
//! - **Read**: one file read per store construction
//! - **Write**: whole-envelope rewrite on every accepted update
//! - **Best for**: a few dozen stores with small filter objects

use crate::domain::error::Result;
use crate::storage::backend::PersistenceBackend;
use std::path::{Path, PathBuf};

/// JSON file persistence backend.
///
/// Stores each key as `{base_dir}/{key}.json`. The base directory is created
/// lazily on the first write, which keeps construction infallible.
///
/// # File Format
///
/// The payload handed over by the store is written verbatim; for a store
/// with id `customers` the file `entity-store-customers.json` contains:
///
/// ```json
/// {
///   "version": 1,
///   "page_size": 25,
///   "column_visibility": { "email": false },
///   "filters": { "status": "active" },
///   "sorting": [{ "column": "name", "direction": "ascending" }]
/// }
/// ```
///
/// # Examples
///
/// ```no_run
/// use crudstore::storage::JsonFileBackend;
///
/// let backend = JsonFileBackend::new("/var/lib/myapp/stores");
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    /// Directory holding one JSON file per persisted key.
    base_dir: PathBuf,
}

impl JsonFileBackend {
    /// Creates a backend rooted at the given directory.
    ///
    /// The directory does not need to exist yet; it is created on the first
    /// write. Reads against a missing directory simply return `None`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        tracing::debug!(dir = ?base_dir, "initializing JSON file backend");
        Self { base_dir }
    }

    /// Creates a backend rooted at the crate's default data directory.
    #[must_use]
    pub fn default_location() -> Self {
        Self::new(crate::infrastructure::paths::data_dir())
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

impl PersistenceBackend for JsonFileBackend {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let _span = tracing::debug_span!("json_load", key = %key).entered();

        let path = self.file_path(key);
        if !path.exists() {
            tracing::debug!("no persisted entry");
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)?;
        tracing::debug!(bytes = contents.len(), "loaded persisted entry");
        Ok(Some(contents))
    }

    fn store(&self, key: &str, payload: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_store", key = %key).entered();

        std::fs::create_dir_all(&self.base_dir)?;

        let path = self.file_path(key);
        let tmp_path = tmp_sibling(&path);

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, payload)?;

        tracing::trace!("renaming temporary file to final location");
        std::fs::rename(&tmp_path, &path)?;

        tracing::debug!(bytes = payload.len(), "persisted entry saved");
        Ok(())
    }
}

/// Temp-file path next to the target so the rename stays on one filesystem.
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path());
        assert!(backend.load("entity-store-customers").unwrap().is_none());
    }

    #[test]
    fn store_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path());

        backend
            .store("entity-store-customers", r#"{"page_size":25}"#)
            .unwrap();

        let loaded = backend.load("entity-store-customers").unwrap();
        assert_eq!(loaded.as_deref(), Some(r#"{"page_size":25}"#));
    }

    #[test]
    fn store_overwrites_previous_payload() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path());

        backend.store("entity-store-calls", "first").unwrap();
        backend.store("entity-store-calls", "second").unwrap();

        assert_eq!(
            backend.load("entity-store-calls").unwrap().as_deref(),
            Some("second")
        );
    }

    #[test]
    fn write_leaves_no_temporary_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path());

        backend.store("entity-store-calls", "payload").unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn creates_base_directory_on_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("stores");
        let backend = JsonFileBackend::new(&nested);

        backend.store("entity-store-meetings", "{}").unwrap();
        assert!(nested.join("entity-store-meetings.json").exists());
    }

    #[test]
    fn keys_do_not_collide_across_stores() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path());

        backend.store("entity-store-calls", "a").unwrap();
        backend.store("entity-store-cities", "b").unwrap();

        assert_eq!(
            backend.load("entity-store-calls").unwrap().as_deref(),
            Some("a")
        );
        assert_eq!(
            backend.load("entity-store-cities").unwrap().as_deref(),
            Some("b")
        );
    }
}
