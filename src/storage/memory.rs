//! In-memory persistence backend.
//!
//! Keeps payloads in a process-local map. Useful for tests, for hosts that
//! have no filesystem, and for hosts that flush state through their own
//! channel and only want crudstore's envelope format.

use crate::domain::error::{Result, StoreError};
use crate::storage::backend::PersistenceBackend;
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local persistence backend.
///
/// Share one instance between a store and the test through an `Arc`: hand a
/// clone of the `Arc` to the store, drop the store, and inspect or reuse the
/// map to simulate a reload.
///
/// # Examples
///
/// ```
/// use crudstore::storage::{MemoryBackend, PersistenceBackend};
///
/// let backend = MemoryBackend::new();
/// backend.store("entity-store-groups", "{}")?;
/// assert_eq!(backend.load("entity-store-groups")?.as_deref(), Some("{}"));
/// # Ok::<(), crudstore::StoreError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    ///
    /// # Panics
    ///
    /// Never panics in practice; lock poisoning is converted to an error in
    /// the trait methods, and this accessor recovers the inner map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether the backend holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PersistenceBackend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Storage("memory backend lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn store(&self, key: &str, payload: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Storage("memory backend lock poisoned".to_string()))?;
        entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let backend = MemoryBackend::new();
        assert!(backend.is_empty());
        assert!(backend.load("entity-store-states").unwrap().is_none());
    }

    #[test]
    fn store_then_load_round_trips() {
        let backend = MemoryBackend::new();
        backend.store("entity-store-states", "payload").unwrap();
        assert_eq!(
            backend.load("entity-store-states").unwrap().as_deref(),
            Some("payload")
        );
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn store_replaces_existing_entry() {
        let backend = MemoryBackend::new();
        backend.store("k", "first").unwrap();
        backend.store("k", "second").unwrap();
        assert_eq!(backend.load("k").unwrap().as_deref(), Some("second"));
        assert_eq!(backend.len(), 1);
    }
}
