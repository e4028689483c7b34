//! Crudstore: an embeddable state container for entity-driven CRUD screens.
//!
//! Crudstore packages the screen state that entity-driven applications
//! re-implement for every business entity:
//! - A modal form with a selected record and a working copy
//! - A paginated table with rows, counts, and loading state
//! - A row selection kept as parallel item and id collections
//! - A filter/sort stack that resets pagination when it changes
//!
//! Around that record it adds the pieces that are easy to get wrong:
//! update coalescing against rapid-fire call sites, atomic multi-field
//! transitions, slice selectors for targeted observation, and durable
//! persistence of exactly four fields.
//!
//! # Architecture
//!
//! The crate follows a layered architecture pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Host application (forms, tables, data fetching)    │  ← Consumer
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Store Layer (store/)                               │  ← Actions
//! │  - Coalescing gate                                  │  ← Partial diffs
//! │  - Atomic merge + notification                      │
//! │  - Slice selectors, registry                        │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Storage Layer │   │ Config        │   │ Observability │
//! │ (storage/)    │   │ (config)      │   │ (observability)│
//! │ - Backend API │   │ - Profiles    │   │ - Tracing init │
//! │ - JSON files  │   │ - TOML        │   │ - EnvFilter    │
//! │ - In-memory   │   │               │   │                │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Clock, data paths (infrastructure/)              │
//! │  - Error types (domain/error)                       │
//! │  - Sort/filter models (domain/model)                │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`store`]: the state container, actions, selectors, and registry
//! - [`storage`]: persistence backends and the durable envelope
//! - [`config`]: TOML store profiles for declarative per-entity defaults
//! - [`domain`]: shared value types and errors
//! - [`infrastructure`]: time source and filesystem locations
//! - [`observability`]: tracing subscriber initialization
//!
//! # Example
//!
//! ```
//! use crudstore::{EntityStore, FormMode, StoreOptions};
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct Customer {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
//! struct CustomerFilter {
//!     status: Option<String>,
//! }
//!
//! let store: EntityStore<Customer, CustomerFilter> = EntityStore::new(
//!     "customers",
//!     StoreOptions {
//!         default_page_size: 25,
//!         update_threshold_ms: 0,
//!         ..StoreOptions::default()
//!     },
//! );
//!
//! store.open_modal(FormMode::Edit, Some(Customer { id: 5, name: "Acme".into() }));
//! assert!(store.form_state().modal_open);
//!
//! store.set_filters(|f| f.status = Some("active".into()));
//! assert_eq!(store.table_state().current_page, 0);
//! ```
//!
//! # Key Design Decisions
//!
//! ## Update Coalescing
//!
//! Live-typed filter inputs and frequently-toggled modals can fire mutations
//! far faster than subscribers can usefully render them. Every mutation
//! passes one gate: arrive within `update_threshold_ms` of the last accepted
//! update and it is dropped outright. Closing the modal is exempt (a cancel
//! must never be swallowed) and a full reset bypasses the gate.
//!
//! ## Partial Persistence
//!
//! Only `page_size`, `column_visibility`, `filters`, and `sorting` survive
//! restarts. Everything else is session state: rows are refetched, selection
//! and modal state are deliberately ephemeral.
//!
//! ## Injectable Clock
//!
//! The gate measures wall-clock time through a [`Clock`] trait object, so
//! tests drive debounce windows deterministically with [`ManualClock`].

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod storage;
pub mod store;

pub use config::StoreProfiles;
pub use domain::{ColumnFilter, Result, SortDirection, SortSpec, StoreError};
pub use infrastructure::{Clock, ManualClock, SystemClock};
pub use storage::{JsonFileBackend, MemoryBackend, PersistenceBackend, PersistedState};
pub use store::{
    EntityState, EntityStore, FilterState, FormMode, FormState, StoreRegistry, SubscriptionId,
    TableState,
};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Construction options for an [`EntityStore`].
///
/// All fields have defaults, so hosts usually spell out only what differs:
///
/// ```
/// use crudstore::StoreOptions;
///
/// #[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// struct Filter;
///
/// let options = StoreOptions::<Filter> {
///     default_page_size: 25,
///     persist: true,
///     ..StoreOptions::default()
/// };
/// assert_eq!(options.update_threshold_ms, 100);
/// ```
pub struct StoreOptions<TFilter> {
    /// Rows per page at construction and after pagination resets.
    ///
    /// Default: 10
    pub default_page_size: u64,

    /// Column the search query targets at construction.
    ///
    /// Default: empty
    pub default_search_column: String,

    /// Filter object at construction and after filter resets.
    ///
    /// Default: `TFilter::default()`
    pub default_filters: TFilter,

    /// Whether `page_size`, `column_visibility`, `filters`, and `sorting`
    /// survive restarts under the key `entity-store-{store_id}`.
    ///
    /// Default: false
    pub persist: bool,

    /// Whether every accepted mutation is logged with its action name and
    /// applied partial.
    ///
    /// Default: false
    pub enable_logging: bool,

    /// Minimum spacing in milliseconds between accepted updates. Mutations
    /// arriving sooner are dropped, except `close_modal` and `reset`.
    ///
    /// Default: 100
    pub update_threshold_ms: i64,

    /// Persistence backend override. When `persist` is set and no backend is
    /// given, a [`JsonFileBackend`] under the crate data directory is used.
    pub backend: Option<Arc<dyn PersistenceBackend>>,

    /// Time source override for the coalescing gate. Defaults to the system
    /// clock; tests inject a [`ManualClock`].
    pub clock: Option<Arc<dyn Clock>>,
}

impl<TFilter: Default> Default for StoreOptions<TFilter> {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            default_search_column: String::new(),
            default_filters: TFilter::default(),
            persist: false,
            enable_logging: false,
            update_threshold_ms: 100,
            backend: None,
            clock: None,
        }
    }
}

impl<TFilter: Clone> Clone for StoreOptions<TFilter> {
    fn clone(&self) -> Self {
        Self {
            default_page_size: self.default_page_size,
            default_search_column: self.default_search_column.clone(),
            default_filters: self.default_filters.clone(),
            persist: self.persist,
            enable_logging: self.enable_logging,
            update_threshold_ms: self.update_threshold_ms,
            backend: self.backend.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<TFilter: fmt::Debug> fmt::Debug for StoreOptions<TFilter> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("default_page_size", &self.default_page_size)
            .field("default_search_column", &self.default_search_column)
            .field("default_filters", &self.default_filters)
            .field("persist", &self.persist)
            .field("enable_logging", &self.enable_logging)
            .field("update_threshold_ms", &self.update_threshold_ms)
            .field("backend", &self.backend.is_some())
            .field("clock", &self.clock.is_some())
            .finish()
    }
}

impl<TFilter: Default> StoreOptions<TFilter> {
    /// Parses options from a host-provided string map.
    ///
    /// Hosts that receive configuration as flat key-value pairs (plugin
    /// runtimes, environment-style config layers) can hand the map over
    /// directly. Unknown keys are ignored, malformed values fall back to
    /// their defaults, and fields a string map cannot express (the filter
    /// object, backend, clock) stay at their defaults.
    ///
    /// # Parsing Rules
    ///
    /// - `default_page_size`: integer, fallback 10
    /// - `default_search_column`: taken verbatim
    /// - `persist`: `true`/`false`, fallback false
    /// - `enable_logging`: `true`/`false`, fallback false
    /// - `update_threshold_ms`: integer, fallback 100
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use crudstore::StoreOptions;
    ///
    /// #[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    /// struct Filter;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("default_page_size".to_string(), "50".to_string());
    /// map.insert("persist".to_string(), "true".to_string());
    ///
    /// let options = StoreOptions::<Filter>::from_map(&map);
    /// assert_eq!(options.default_page_size, 50);
    /// assert!(options.persist);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let mut options = Self::default();

        if let Some(page_size) = map
            .get("default_page_size")
            .and_then(|s| s.parse::<u64>().ok())
        {
            options.default_page_size = page_size;
        }

        if let Some(search_column) = map.get("default_search_column") {
            options.default_search_column.clone_from(search_column);
        }

        if let Some(persist) = map.get("persist").and_then(|s| s.parse::<bool>().ok()) {
            options.persist = persist;
        }

        if let Some(enable_logging) = map
            .get("enable_logging")
            .and_then(|s| s.parse::<bool>().ok())
        {
            options.enable_logging = enable_logging;
        }

        if let Some(threshold) = map
            .get("update_threshold_ms")
            .and_then(|s| s.parse::<i64>().ok())
        {
            options.update_threshold_ms = threshold;
        }

        options
    }
}
