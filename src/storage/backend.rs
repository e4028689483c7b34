//! Persistence backend abstraction.
//!
//! This module defines the [`PersistenceBackend`] trait that abstracts over
//! durable storage media. This allows seamless switching between backends
//! (JSON files, an in-memory map, a host-provided key-value store) without
//! changing store logic.
//!
//! # Design Philosophy
//!
//! The trait is deliberately a two-method key-value surface, not a generic
//! ORM. The store serializes its persisted envelope to a JSON string before
//! it reaches the backend, so implementations move opaque payloads and stay
//! object-safe. Each store writes under a single key of the form
//! `entity-store-{store_id}`.

use crate::domain::error::Result;

/// Abstraction over durable storage for persisted store fields.
///
/// Implementations must be safe to share between threads; the store calls
/// [`store`] from whichever thread performed the accepted mutation.
///
/// Writes are fire-and-forget from the store's perspective: a failed write is
/// logged and ignored, so implementations should not rely on the caller
/// retrying.
///
/// [`store`]: PersistenceBackend::store
///
/// # Implementations
///
/// - [`JsonFileBackend`](crate::storage::JsonFileBackend): one JSON file per
///   key with atomic writes (default)
/// - [`MemoryBackend`](crate::storage::MemoryBackend): process-local map for
///   tests and filesystem-less hosts
///
/// # Examples
///
/// ```
/// use crudstore::storage::{MemoryBackend, PersistenceBackend};
///
/// let backend = MemoryBackend::new();
/// backend.store("entity-store-customers", "{\"page_size\":25}")?;
/// assert!(backend.load("entity-store-customers")?.is_some());
/// # Ok::<(), crudstore::StoreError>(())
/// ```
pub trait PersistenceBackend: Send + Sync {
    /// Reads the payload stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing has been stored under the key, which
    /// is the normal first-run case.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Writes `payload` under `key`, replacing any previous value.
    ///
    /// The payload is a complete serialized envelope; partial updates are
    /// never requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be written.
    fn store(&self, key: &str, payload: &str) -> Result<()>;
}
