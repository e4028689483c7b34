//! Store layer coordinating state, actions, and observers.
//!
//! This module defines [`EntityStore`], the per-entity-type state container
//! at the center of the crate. A store guards one [`EntityState`] record and
//! exposes a fixed set of mutator actions; every action funnels through one
//! dispatch path that applies the coalescing gate, computes a field-diffed
//! partial, commits it atomically, persists the durable subset, and notifies
//! subscribers with a snapshot.
//!
//! # Architecture
//!
//! The store follows a unidirectional data flow pattern:
//!
//! ```text
//! Action call → Gate decision → Partial diff → Atomic merge → Persist → Notify
//!                    │                │
//!                 (drop)          (skip if empty)
//! ```
//!
//! # Modules
//!
//! - [`modes`]: form mode state machine
//! - [`state`]: the guarded state record
//! - [`selectors`]: read-side slice projections
//! - [`registry`]: one-instance-per-id store registry
//! - `gate`, `update`: internal gate bookkeeping and partial-update types
//!
//! # Example
//!
//! ```
//! use crudstore::{EntityStore, StoreOptions};
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct City { id: u64, name: String }
//!
//! #[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
//! struct CityFilter { country: Option<String> }
//!
//! let store: EntityStore<City, CityFilter> =
//!     EntityStore::new("cities", StoreOptions::default());
//! store.set_page_size(25);
//! assert_eq!(store.table_state().page_size, 25);
//! assert_eq!(store.table_state().current_page, 0);
//! ```

mod gate;
pub mod modes;
pub mod registry;
pub mod selectors;
pub mod state;
mod update;

pub use modes::FormMode;
pub use registry::StoreRegistry;
pub use selectors::{FilterState, FormState, TableState};
pub use state::EntityState;

use crate::domain::model::{ColumnFilter, SortSpec};
use crate::infrastructure::clock::{Clock, SystemClock};
use crate::storage::backend::PersistenceBackend;
use crate::storage::json::JsonFileBackend;
use crate::storage::models::{persist_key, PersistedState, PERSIST_VERSION};
use crate::StoreOptions;
use gate::{GatePolicy, GateState};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use update::{diff, StateUpdate};

/// Handle returned by [`EntityStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type SubscriberFn<TData, TFilter> = Arc<dyn Fn(&EntityState<TData, TFilter>) + Send + Sync>;

/// State plus gate bookkeeping, guarded together so a gate decision and the
/// update it admits are one critical section.
struct Inner<TData, TFilter> {
    state: EntityState<TData, TFilter>,
    gate: GateState,
}

/// A per-entity-type observable state container.
///
/// One store holds the complete screen state for one entity type: the modal
/// form, the paginated table, the row selection, and the filter/sort stack.
/// All mutation goes through the action methods; reads go through
/// [`snapshot`](Self::snapshot) or the slice selectors.
///
/// # Update coalescing
///
/// Mutations arriving within `update_threshold_ms` of the last accepted one
/// are dropped entirely, except [`close_modal`](Self::close_modal) (always
/// applies while the modal is open) and [`reset`](Self::reset) (bypasses the
/// gate). A mutation whose computed partial changes nothing is skipped even
/// when the gate admits it.
///
/// # Persistence
///
/// With `persist` enabled, every accepted update writes `page_size`,
/// `column_visibility`, `filters`, and `sorting` to the configured backend
/// under `entity-store-{store_id}`, and construction hydrates those four
/// fields back. Writes are fire-and-forget; failures are logged and ignored.
///
/// # Thread Safety
///
/// The store is `Send + Sync`. Writes take the state lock for the duration
/// of one atomic merge; subscriber callbacks run after the lock is released,
/// on the mutating thread, with a cloned snapshot.
pub struct EntityStore<TData, TFilter> {
    store_id: String,
    enable_logging: bool,
    update_threshold_ms: i64,
    clock: Arc<dyn Clock>,
    backend: Option<Arc<dyn PersistenceBackend>>,
    /// Construction-default state, the target of every reset action.
    initial: EntityState<TData, TFilter>,
    inner: RwLock<Inner<TData, TFilter>>,
    subscribers: Mutex<Vec<(SubscriptionId, SubscriberFn<TData, TFilter>)>>,
    next_subscription: AtomicU64,
}

impl<TData, TFilter> EntityStore<TData, TFilter>
where
    TData: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static,
    TFilter: Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Creates a store for `store_id` with the given options.
    ///
    /// Construction never fails. When persistence is enabled the durable
    /// subset is hydrated from the backend; a missing entry is the normal
    /// first run, and an unreadable one is logged and ignored so a corrupt
    /// file can never brick a screen.
    ///
    /// `store_id` namespaces log lines and the persisted entry; it must be
    /// unique per store instance (the [`StoreRegistry`] enforces this for
    /// hosts that want it enforced).
    pub fn new(store_id: impl Into<String>, options: StoreOptions<TFilter>) -> Self {
        let store_id = store_id.into();

        let clock = options
            .clock
            .clone()
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);

        let backend = if options.persist {
            Some(options.backend.clone().unwrap_or_else(|| {
                Arc::new(JsonFileBackend::default_location()) as Arc<dyn PersistenceBackend>
            }))
        } else {
            None
        };

        let initial = EntityState::initial(&options);
        let mut state = initial.clone();
        if let Some(backend) = &backend {
            hydrate(&mut state, backend.as_ref(), &store_id);
        }

        tracing::debug!(
            store_id = %store_id,
            page_size = state.page_size,
            persist = backend.is_some(),
            threshold_ms = options.update_threshold_ms,
            "entity store created"
        );

        Self {
            store_id,
            enable_logging: options.enable_logging,
            update_threshold_ms: options.update_threshold_ms,
            clock,
            backend,
            initial,
            inner: RwLock::new(Inner {
                state,
                gate: GateState::default(),
            }),
            subscribers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// The id this store was created under.
    #[must_use]
    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    /// Whether accepted updates are written to a persistence backend.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.backend.is_some()
    }

    // ---- Observation ----------------------------------------------------

    /// Returns a clone of the full current state.
    #[must_use]
    pub fn snapshot(&self) -> EntityState<TData, TFilter> {
        read_lock(&self.inner).state.clone()
    }

    /// Returns the form slice of the current state.
    #[must_use]
    pub fn form_state(&self) -> FormState<TData> {
        FormState::project(&read_lock(&self.inner).state)
    }

    /// Returns the table slice of the current state.
    #[must_use]
    pub fn table_state(&self) -> TableState<TData> {
        TableState::project(&read_lock(&self.inner).state)
    }

    /// Returns the filter slice of the current state.
    #[must_use]
    pub fn filter_state(&self) -> FilterState<TFilter> {
        FilterState::project(&read_lock(&self.inner).state)
    }

    /// Registers an observer invoked with a snapshot after every accepted
    /// update.
    ///
    /// Callbacks run on the thread that performed the mutation, after the
    /// state lock is released; a callback may therefore call back into the
    /// store, including subscribing or unsubscribing.
    pub fn subscribe(
        &self,
        observer: impl Fn(&EntityState<TData, TFilter>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        let observer: SubscriberFn<TData, TFilter> = Arc::new(observer);
        mutex_lock(&self.subscribers).push((id, observer));
        id
    }

    /// Removes an observer. Returns `false` when the id was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = mutex_lock(&self.subscribers);
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    // ---- Form actions ---------------------------------------------------

    /// Opens the modal form in `mode`, selecting `item` and mirroring it
    /// into the form data. Clears any previous submit error.
    pub fn open_modal(&self, mode: FormMode, item: Option<TData>) -> bool {
        self.apply("open_modal", GatePolicy::Coalesced, |s| {
            let form_data = item.clone().unwrap_or_default();
            StateUpdate {
                modal_open: diff(&s.modal_open, true),
                form_mode: diff(&s.form_mode, mode),
                selected_item: diff(&s.selected_item, item),
                form_data: diff(&s.form_data, form_data),
                submit_error: diff(&s.submit_error, None),
                ..StateUpdate::empty()
            }
        })
    }

    /// Closes the modal form, clearing the selected item, form data, and
    /// submit error together.
    ///
    /// This is the one action exempt from the coalescing threshold: a cancel
    /// the user clicked must never be silently swallowed. When the modal is
    /// already closed this is a no-op.
    pub fn close_modal(&self) -> bool {
        {
            let inner = read_lock(&self.inner);
            if !inner.state.modal_open {
                tracing::trace!(store_id = %self.store_id, "close_modal with modal already closed");
                return false;
            }
        }

        self.apply("close_modal", GatePolicy::AlwaysApply, |s| StateUpdate {
            modal_open: diff(&s.modal_open, false),
            selected_item: diff(&s.selected_item, None),
            form_data: diff(&s.form_data, TData::default()),
            submit_error: diff(&s.submit_error, None),
            ..StateUpdate::empty()
        })
    }

    /// Sets the form mode without touching anything else.
    pub fn set_form_mode(&self, mode: FormMode) -> bool {
        self.apply("set_form_mode", GatePolicy::Coalesced, |s| StateUpdate {
            form_mode: diff(&s.form_mode, mode),
            ..StateUpdate::empty()
        })
    }

    /// Sets the selected item and mirrors it into the form data.
    pub fn set_selected_item(&self, item: Option<TData>) -> bool {
        self.apply("set_selected_item", GatePolicy::Coalesced, |s| {
            let form_data = item.clone().unwrap_or_default();
            StateUpdate {
                selected_item: diff(&s.selected_item, item),
                form_data: diff(&s.form_data, form_data),
                ..StateUpdate::empty()
            }
        })
    }

    /// Patches the form data in place.
    ///
    /// The patch runs against a copy of the current form data; when the
    /// result is structurally equal to what is already there, the update is
    /// suppressed and observers are not notified.
    pub fn update_form_data(&self, patch: impl FnOnce(&mut TData)) -> bool {
        self.apply("update_form_data", GatePolicy::Coalesced, |s| {
            let mut next = s.form_data.clone();
            patch(&mut next);
            StateUpdate {
                form_data: diff(&s.form_data, next),
                ..StateUpdate::empty()
            }
        })
    }

    /// Replaces the form data wholesale with `defaults`, or with an empty
    /// record when `None`.
    pub fn reset_form_data(&self, defaults: Option<TData>) -> bool {
        self.apply("reset_form_data", GatePolicy::Coalesced, |s| StateUpdate {
            form_data: diff(&s.form_data, defaults.unwrap_or_default()),
            ..StateUpdate::empty()
        })
    }

    /// Sets the submitting flag.
    pub fn set_submitting(&self, submitting: bool) -> bool {
        self.apply("set_submitting", GatePolicy::Coalesced, |s| StateUpdate {
            submitting: diff(&s.submitting, submitting),
            ..StateUpdate::empty()
        })
    }

    /// Stores or clears the caller-supplied submission error.
    pub fn set_submit_error(&self, error: Option<String>) -> bool {
        self.apply("set_submit_error", GatePolicy::Coalesced, |s| StateUpdate {
            submit_error: diff(&s.submit_error, error),
            ..StateUpdate::empty()
        })
    }

    // ---- Table actions --------------------------------------------------

    /// Replaces the loaded rows.
    pub fn set_items(&self, items: Vec<TData>) -> bool {
        self.apply("set_items", GatePolicy::Coalesced, |s| StateUpdate {
            items: diff(&s.items, items),
            ..StateUpdate::empty()
        })
    }

    /// Replaces the total row count.
    pub fn set_total_items(&self, total_items: u64) -> bool {
        self.apply("set_total_items", GatePolicy::Coalesced, |s| StateUpdate {
            total_items: diff(&s.total_items, total_items),
            ..StateUpdate::empty()
        })
    }

    /// Replaces the total page count.
    pub fn set_total_pages(&self, total_pages: u64) -> bool {
        self.apply("set_total_pages", GatePolicy::Coalesced, |s| StateUpdate {
            total_pages: diff(&s.total_pages, total_pages),
            ..StateUpdate::empty()
        })
    }

    /// Sets the current page index. The store never clamps it against
    /// `total_pages`; that is the caller's responsibility.
    pub fn set_current_page(&self, page: u64) -> bool {
        self.apply("set_current_page", GatePolicy::Coalesced, |s| StateUpdate {
            current_page: diff(&s.current_page, page),
            ..StateUpdate::empty()
        })
    }

    /// Sets the page size and resets the current page to the first page in
    /// the same update.
    pub fn set_page_size(&self, page_size: u64) -> bool {
        self.apply("set_page_size", GatePolicy::Coalesced, |s| StateUpdate {
            page_size: diff(&s.page_size, page_size),
            current_page: diff(&s.current_page, 0),
            ..StateUpdate::empty()
        })
    }

    /// Sets the table loading flag.
    pub fn set_loading(&self, loading: bool) -> bool {
        self.apply("set_loading", GatePolicy::Coalesced, |s| StateUpdate {
            loading: diff(&s.loading, loading),
            ..StateUpdate::empty()
        })
    }

    /// Stores or clears the caller-supplied table error.
    pub fn set_error(&self, error: Option<String>) -> bool {
        self.apply("set_error", GatePolicy::Coalesced, |s| StateUpdate {
            error: diff(&s.error, error),
            ..StateUpdate::empty()
        })
    }

    // ---- Selection actions ----------------------------------------------

    /// Replaces the selected rows. Does not touch `selected_ids`.
    pub fn set_selected_items(&self, items: Vec<TData>) -> bool {
        self.apply("set_selected_items", GatePolicy::Coalesced, |s| {
            StateUpdate {
                selected_items: diff(&s.selected_items, items),
                ..StateUpdate::empty()
            }
        })
    }

    /// Replaces the selected identifiers. Does not touch `selected_items`.
    pub fn set_selected_ids(&self, ids: Vec<String>) -> bool {
        self.apply("set_selected_ids", GatePolicy::Coalesced, |s| StateUpdate {
            selected_ids: diff(&s.selected_ids, ids),
            ..StateUpdate::empty()
        })
    }

    // ---- Filter/sort actions --------------------------------------------

    /// Replaces the sort order.
    pub fn set_sorting(&self, sorting: Vec<SortSpec>) -> bool {
        self.apply("set_sorting", GatePolicy::Coalesced, |s| StateUpdate {
            sorting: diff(&s.sorting, sorting),
            ..StateUpdate::empty()
        })
    }

    /// Patches the filter object and resets the current page to the first
    /// page in the same update.
    pub fn set_filters(&self, patch: impl FnOnce(&mut TFilter)) -> bool {
        self.apply("set_filters", GatePolicy::Coalesced, |s| {
            let mut next = s.filters.clone();
            patch(&mut next);
            StateUpdate {
                filters: diff(&s.filters, next),
                current_page: diff(&s.current_page, 0),
                ..StateUpdate::empty()
            }
        })
    }

    /// Replaces the per-column filters and resets the current page.
    pub fn set_column_filters(&self, column_filters: Vec<ColumnFilter>) -> bool {
        self.apply("set_column_filters", GatePolicy::Coalesced, |s| {
            StateUpdate {
                column_filters: diff(&s.column_filters, column_filters),
                current_page: diff(&s.current_page, 0),
                ..StateUpdate::empty()
            }
        })
    }

    /// Replaces the column visibility map. Does not reset the page; hiding
    /// a column does not change which rows match.
    pub fn set_column_visibility(&self, visibility: HashMap<String, bool>) -> bool {
        self.apply("set_column_visibility", GatePolicy::Coalesced, |s| {
            StateUpdate {
                column_visibility: diff(&s.column_visibility, visibility),
                ..StateUpdate::empty()
            }
        })
    }

    /// Sets the global free-text filter and resets the current page.
    pub fn set_global_filter(&self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.apply("set_global_filter", GatePolicy::Coalesced, |s| {
            StateUpdate {
                global_filter: diff(&s.global_filter, value),
                current_page: diff(&s.current_page, 0),
                ..StateUpdate::empty()
            }
        })
    }

    /// Sets the search query and resets the current page.
    pub fn set_search_query(&self, query: impl Into<String>) -> bool {
        let query = query.into();
        self.apply("set_search_query", GatePolicy::Coalesced, |s| StateUpdate {
            search_query: diff(&s.search_query, query),
            current_page: diff(&s.current_page, 0),
            ..StateUpdate::empty()
        })
    }

    /// Sets the column the search query targets. Does not reset the page.
    pub fn set_search_column(&self, column: impl Into<String>) -> bool {
        let column = column.into();
        self.apply("set_search_column", GatePolicy::Coalesced, |s| {
            StateUpdate {
                search_column: diff(&s.search_column, column),
                ..StateUpdate::empty()
            }
        })
    }

    // ---- Reset actions --------------------------------------------------

    /// Returns the filter stack to construction defaults and resets the
    /// current page: filters to their defaults, column filters and global
    /// filter and search query to empty.
    pub fn reset_filters(&self) -> bool {
        self.apply("reset_filters", GatePolicy::Coalesced, |s| StateUpdate {
            filters: diff(&s.filters, self.initial.filters.clone()),
            column_filters: diff(&s.column_filters, Vec::new()),
            global_filter: diff(&s.global_filter, String::new()),
            search_query: diff(&s.search_query, String::new()),
            current_page: diff(&s.current_page, 0),
            ..StateUpdate::empty()
        })
    }

    /// Returns to the first page at the default page size.
    pub fn reset_pagination(&self) -> bool {
        self.apply("reset_pagination", GatePolicy::Coalesced, |s| StateUpdate {
            current_page: diff(&s.current_page, 0),
            page_size: diff(&s.page_size, self.initial.page_size),
            ..StateUpdate::empty()
        })
    }

    /// Clears rows, counts, page, selection, sorting, and the filter stack
    /// back to construction defaults. Leaves the form slice, page size,
    /// search column, and column visibility alone.
    pub fn reset_table(&self) -> bool {
        self.apply("reset_table", GatePolicy::Coalesced, |s| StateUpdate {
            items: diff(&s.items, Vec::new()),
            total_items: diff(&s.total_items, 0),
            total_pages: diff(&s.total_pages, 0),
            current_page: diff(&s.current_page, 0),
            selected_items: diff(&s.selected_items, Vec::new()),
            selected_ids: diff(&s.selected_ids, Vec::new()),
            sorting: diff(&s.sorting, Vec::new()),
            filters: diff(&s.filters, self.initial.filters.clone()),
            column_filters: diff(&s.column_filters, Vec::new()),
            global_filter: diff(&s.global_filter, String::new()),
            search_query: diff(&s.search_query, String::new()),
            ..StateUpdate::empty()
        })
    }

    /// Resets the full state to its construction defaults, bypassing the
    /// coalescing gate entirely.
    ///
    /// The gate itself returns to its construction state too, so the first
    /// mutation after a reset is never dropped.
    pub fn reset(&self) -> bool {
        self.apply("reset", GatePolicy::Bypass, |s| {
            StateUpdate::diff_states(s, &self.initial)
        })
    }

    // ---- Dispatch -------------------------------------------------------

    /// Single dispatch path for every mutation.
    ///
    /// Returns whether the update was accepted and applied. The gate
    /// decision, the diff, and the merge happen under one write lock;
    /// persistence and subscriber notification happen after it is released.
    fn apply(
        &self,
        action: &'static str,
        policy: GatePolicy,
        build: impl FnOnce(&EntityState<TData, TFilter>) -> StateUpdate<TData, TFilter>,
    ) -> bool {
        let _span =
            tracing::debug_span!("store_mutation", store_id = %self.store_id, action).entered();

        let now = self.clock.now_millis();
        let snapshot = {
            let mut inner = write_lock(&self.inner);

            if !inner.gate.admits(policy, now, self.update_threshold_ms) {
                tracing::trace!(store_id = %self.store_id, action, "update dropped by coalescing gate");
                return false;
            }

            if policy == GatePolicy::Bypass {
                inner.gate.clear();
            }

            let update = build(&inner.state);
            if update.is_empty() {
                tracing::trace!(store_id = %self.store_id, action, "no-op update skipped");
                return false;
            }

            if self.enable_logging {
                tracing::debug!(
                    store_id = %self.store_id,
                    action,
                    update = ?update,
                    "mutation applied"
                );
            }

            update.apply(&mut inner.state);
            if policy != GatePolicy::Bypass {
                inner.gate.stamp(now);
            }
            inner.state.clone()
        };

        self.persist(&snapshot);
        self.notify(&snapshot);
        true
    }

    /// Writes the durable subset to the backend, when one is configured.
    fn persist(&self, state: &EntityState<TData, TFilter>) {
        let Some(backend) = &self.backend else {
            return;
        };

        let envelope = PersistedState {
            version: PERSIST_VERSION,
            page_size: state.page_size,
            column_visibility: state.column_visibility.clone(),
            filters: state.filters.clone(),
            sorting: state.sorting.clone(),
        };

        let payload = match serde_json::to_string_pretty(&envelope) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(store_id = %self.store_id, error = %e, "failed to serialize persisted state");
                return;
            }
        };

        if let Err(e) = backend.store(&persist_key(&self.store_id), &payload) {
            tracing::warn!(store_id = %self.store_id, error = %e, "failed to write persisted state");
        }
    }

    /// Invokes every subscriber with the post-update snapshot.
    fn notify(&self, state: &EntityState<TData, TFilter>) {
        let subscribers: Vec<SubscriberFn<TData, TFilter>> = mutex_lock(&self.subscribers)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in subscribers {
            observer(state);
        }
    }
}

/// Merges the persisted subset over construction defaults.
///
/// Any failure leaves the defaults in place; a store must come up even when
/// its persisted entry is missing or unreadable.
fn hydrate<TData, TFilter>(
    state: &mut EntityState<TData, TFilter>,
    backend: &dyn PersistenceBackend,
    store_id: &str,
) where
    TFilter: DeserializeOwned,
{
    let key = persist_key(store_id);
    let payload = match backend.load(&key) {
        Ok(Some(payload)) => payload,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(store_id = %store_id, error = %e, "failed to load persisted state");
            return;
        }
    };

    match serde_json::from_str::<PersistedState<TFilter>>(&payload) {
        Ok(envelope) => {
            state.page_size = envelope.page_size;
            state.column_visibility = envelope.column_visibility;
            state.filters = envelope.filters;
            state.sorting = envelope.sorting;
            tracing::debug!(store_id = %store_id, version = envelope.version, "hydrated persisted state");
        }
        Err(e) => {
            tracing::warn!(store_id = %store_id, error = %e, "failed to parse persisted state");
        }
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn mutex_lock<T>(lock: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}
