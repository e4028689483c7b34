//! End-to-end behavior of the entity store through its public API.
//!
//! These tests drive full action sequences the way a hosting screen would:
//! pagination and filter interplay, the modal open/close cycle, debounce
//! windows under a manual clock, and persistence across a simulated reload.

use crudstore::{
    Clock, ColumnFilter, EntityStore, FormMode, ManualClock, MemoryBackend, PersistenceBackend,
    SortSpec, StoreOptions, StoreRegistry,
};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq)]
struct Customer {
    id: u64,
    name: String,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
struct CustomerFilter {
    status: Option<String>,
}

type Store = EntityStore<Customer, CustomerFilter>;

fn acme() -> Customer {
    Customer {
        id: 5,
        name: "Acme".to_string(),
    }
}

fn store_with_clock() -> (Store, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let store = Store::new(
        "customers",
        StoreOptions {
            clock: Some(clock.clone() as Arc<dyn Clock>),
            ..StoreOptions::default()
        },
    );
    (store, clock)
}

#[test]
fn pagination_and_filter_interplay() {
    let (store, clock) = store_with_clock();

    // Page size change lands together with its page reset.
    assert!(store.set_page_size(25));
    let table = store.table_state();
    assert_eq!(table.page_size, 25);
    assert_eq!(table.current_page, 0);

    // Navigating afterwards is an independent update.
    clock.advance(200);
    assert!(store.set_current_page(3));
    assert_eq!(store.table_state().current_page, 3);

    // A filter change resets the page even though the page change was the
    // most recent action.
    clock.advance(200);
    assert!(store.set_filters(|f| f.status = Some("active".to_string())));
    let snapshot = store.snapshot();
    assert_eq!(snapshot.filters.status.as_deref(), Some("active"));
    assert_eq!(snapshot.current_page, 0);
}

#[test]
fn modal_cycle_mirrors_and_clears_together() {
    let (store, clock) = store_with_clock();

    assert!(store.open_modal(FormMode::Edit, Some(acme())));
    let form = store.form_state();
    assert!(form.modal_open);
    assert_eq!(form.form_mode, FormMode::Edit);
    assert_eq!(form.selected_item, Some(acme()));
    assert_eq!(form.form_data, acme());

    // Closing immediately afterwards is inside the debounce window and must
    // still apply.
    clock.advance(1);
    assert!(store.close_modal());
    let form = store.form_state();
    assert!(!form.modal_open);
    assert_eq!(form.selected_item, None);
    assert_eq!(form.form_data, Customer::default());
}

#[test]
fn keystroke_burst_is_coalesced() {
    let (store, clock) = store_with_clock();

    // Eleven keystrokes, 20ms apart. Only strokes landing at least 100ms
    // after the last accepted one survive.
    let mut accepted = 0;
    for i in 1..=11 {
        let query: String = "acme corp".chars().take(i).collect();
        if store.set_search_query(query) {
            accepted += 1;
        }
        clock.advance(20);
    }

    assert_eq!(accepted, 3);
    // The last accepted stroke was the 11th at t=200: "acme corp".
    assert_eq!(store.filter_state().search_query, "acme corp");
}

#[test]
fn search_column_change_keeps_the_page() {
    let (store, clock) = store_with_clock();
    store.set_current_page(4);

    clock.advance(200);
    assert!(store.set_search_column("email"));
    assert_eq!(store.table_state().current_page, 4);

    clock.advance(200);
    assert!(store.set_search_query("ac"));
    assert_eq!(store.table_state().current_page, 0);
}

#[test]
fn external_fetch_cycle_feeds_the_table() {
    let clock = Arc::new(ManualClock::new(0));
    let store = Store::new(
        "customers",
        StoreOptions {
            update_threshold_ms: 0,
            clock: Some(clock as Arc<dyn Clock>),
            ..StoreOptions::default()
        },
    );

    // The caller owns the fetch; the store just transports its phases.
    store.set_loading(true);
    store.set_items(vec![acme()]);
    store.set_total_items(1);
    store.set_total_pages(1);
    store.set_loading(false);

    let table = store.table_state();
    assert_eq!(table.items, vec![acme()]);
    assert_eq!(table.total_items, 1);
    assert!(!table.loading);
    assert_eq!(table.error, None);

    store.set_error(Some("upstream timeout".to_string()));
    assert_eq!(store.table_state().error.as_deref(), Some("upstream timeout"));
}

#[test]
fn persisted_fields_survive_a_reload() {
    let backend = Arc::new(MemoryBackend::new());

    {
        let store = Store::new(
            "customers",
            StoreOptions {
                persist: true,
                update_threshold_ms: 0,
                backend: Some(backend.clone() as Arc<dyn PersistenceBackend>),
                ..StoreOptions::default()
            },
        );

        store.set_page_size(50);
        store.set_column_visibility(HashMap::from([("email".to_string(), false)]));
        store.set_filters(|f| f.status = Some("active".to_string()));
        store.set_sorting(vec![SortSpec::descending("created_at")]);

        // Session-only state that must not come back.
        store.set_items(vec![acme()]);
        store.set_selected_ids(vec!["5".to_string()]);
        store.open_modal(FormMode::Edit, Some(acme()));
    }

    let reloaded = Store::new(
        "customers",
        StoreOptions {
            persist: true,
            backend: Some(backend as Arc<dyn PersistenceBackend>),
            ..StoreOptions::default()
        },
    );

    let snapshot = reloaded.snapshot();
    assert_eq!(snapshot.page_size, 50);
    assert_eq!(
        snapshot.column_visibility,
        HashMap::from([("email".to_string(), false)])
    );
    assert_eq!(snapshot.filters.status.as_deref(), Some("active"));
    assert_eq!(snapshot.sorting, vec![SortSpec::descending("created_at")]);

    assert!(snapshot.items.is_empty());
    assert!(snapshot.selected_ids.is_empty());
    assert!(!snapshot.modal_open);
    assert_eq!(snapshot.current_page, 0);
}

#[test]
fn json_files_survive_a_reload_on_disk() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = Store::new(
            "customers",
            StoreOptions {
                persist: true,
                update_threshold_ms: 0,
                backend: Some(Arc::new(crudstore::JsonFileBackend::new(dir.path()))
                    as Arc<dyn PersistenceBackend>),
                ..StoreOptions::default()
            },
        );
        store.set_page_size(100);
    }

    assert!(dir.path().join("entity-store-customers.json").exists());

    let reloaded = Store::new(
        "customers",
        StoreOptions {
            persist: true,
            backend: Some(Arc::new(crudstore::JsonFileBackend::new(dir.path()))
                as Arc<dyn PersistenceBackend>),
            ..StoreOptions::default()
        },
    );
    assert_eq!(reloaded.table_state().page_size, 100);
}

#[test]
fn column_filters_travel_as_opaque_values() {
    let clock = Arc::new(ManualClock::new(0));
    let store = Store::new(
        "customers",
        StoreOptions {
            update_threshold_ms: 0,
            clock: Some(clock as Arc<dyn Clock>),
            ..StoreOptions::default()
        },
    );

    store.set_current_page(2);
    store.set_column_filters(vec![
        ColumnFilter::new("status", "active"),
        ColumnFilter::new("amount", serde_json::json!({ "min": 10, "max": 90 })),
    ]);

    let filters = store.filter_state();
    assert_eq!(filters.column_filters.len(), 2);
    assert_eq!(store.table_state().current_page, 0);
}

#[test]
fn registry_serves_one_store_per_screen() {
    let registry = StoreRegistry::new();

    let customers = registry
        .get_or_create::<Customer, CustomerFilter>("customers", || StoreOptions {
            update_threshold_ms: 0,
            ..StoreOptions::default()
        })
        .unwrap();
    customers.set_page_size(50);

    // A second resolution anywhere in the application sees the same state.
    let again = registry
        .get_or_create::<Customer, CustomerFilter>("customers", StoreOptions::default)
        .unwrap();
    assert_eq!(again.table_state().page_size, 50);
    assert!(Arc::ptr_eq(&customers, &again));
}

#[test]
fn profile_file_drives_store_construction() {
    let profiles = crudstore::StoreProfiles::from_toml(
        r#"
        [defaults]
        page_size = 25

        [stores.customers]
        page_size = 50
        search_column = "name"
        "#,
    )
    .unwrap();

    let registry = StoreRegistry::new();
    let store = registry
        .get_or_create::<Customer, CustomerFilter>("customers", || {
            profiles.resolve("customers")
        })
        .unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.page_size, 50);
    assert_eq!(snapshot.search_column, "name");
}
