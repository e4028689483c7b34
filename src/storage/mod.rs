//! Persistence layer for the durable subset of store state.
//!
//! This module provides the storage abstraction through which a store's
//! persisted fields (`page_size`, `column_visibility`, `filters`, `sorting`)
//! survive process restarts. Each store writes a versioned JSON envelope
//! under the key `entity-store-{store_id}`.
//!
//! # Modules
//!
//! - `backend`: persistence trait abstraction for backend implementations
//! - `json`: JSON file-based backend with atomic writes
//! - `memory`: process-local backend for tests and filesystem-less hosts
//! - `models`: the versioned envelope type, separate from live state

pub mod backend;
pub mod json;
pub mod memory;
pub mod models;

pub use backend::PersistenceBackend;
pub use json::JsonFileBackend;
pub use memory::MemoryBackend;
pub use models::{persist_key, PersistedState, PERSIST_VERSION};
