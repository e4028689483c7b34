//! The per-entity state record.
//!
//! This module defines [`EntityState`], the single record a store guards.
//! Conceptually it is four attribute groups living side by side: the modal
//! form, the paginated table, the row selection, and the filter/sort stack.
//! Grouping them in one record is what lets linked transitions (a filter
//! change resetting the page) commit as one atomic update.
//!
//! # Ownership
//!
//! The record is privately owned by its [`EntityStore`](crate::EntityStore);
//! external code observes clones and mutates only through the store's
//! actions. `selected_items` and `selected_ids` are parallel collections the
//! caller keeps consistent; the store never cross-validates them.

use crate::domain::model::{ColumnFilter, SortSpec};
use crate::store::modes::FormMode;
use crate::StoreOptions;
use std::collections::HashMap;

/// Complete state of one entity screen.
///
/// `TData` is the entity record shown in the table and edited in the form.
/// `TFilter` is the entity-specific filter object; its shape is entirely the
/// caller's, the store only needs structural equality to suppress no-op
/// updates.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityState<TData, TFilter> {
    // Form slice.
    /// Whether the modal form is open.
    pub modal_open: bool,

    /// Presentation mode of the modal form.
    pub form_mode: FormMode,

    /// Record the form was opened on, if any.
    ///
    /// Mirrored into `form_data` whenever it is set; both reset together
    /// when the modal closes.
    pub selected_item: Option<TData>,

    /// Working copy edited by the form. "Empty" is `TData::default()`.
    pub form_data: TData,

    /// Whether a submission is in flight.
    pub submitting: bool,

    /// Caller-supplied submission error, stored verbatim.
    pub submit_error: Option<String>,

    // Table slice.
    /// Rows of the currently loaded page.
    pub items: Vec<TData>,

    /// Total row count across all pages.
    pub total_items: u64,

    /// Total page count.
    pub total_pages: u64,

    /// Zero-based current page index. Never clamped by the store.
    pub current_page: u64,

    /// Rows per page.
    pub page_size: u64,

    /// Whether the table is loading.
    pub loading: bool,

    /// Caller-supplied load error, stored verbatim.
    pub error: Option<String>,

    // Selection slice.
    /// Currently selected rows.
    pub selected_items: Vec<TData>,

    /// Identifiers of the selected rows, maintained by the caller in
    /// parallel with `selected_items`.
    pub selected_ids: Vec<String>,

    // Filter/sort slice.
    /// Entity-specific filter object.
    pub filters: TFilter,

    /// Per-column filters.
    pub column_filters: Vec<ColumnFilter>,

    /// Per-column visibility toggles.
    pub column_visibility: HashMap<String, bool>,

    /// Free-text filter applied across all columns.
    pub global_filter: String,

    /// Search query string.
    pub search_query: String,

    /// Column the search query targets.
    pub search_column: String,

    /// Ordered sort specification.
    pub sorting: Vec<SortSpec>,
}

impl<TData, TFilter> EntityState<TData, TFilter>
where
    TData: Default,
    TFilter: Clone,
{
    /// Builds the construction-default state for the given options.
    ///
    /// This is also the state [`reset`](crate::EntityStore::reset) returns
    /// to, independent of anything later hydrated from persistence.
    pub(crate) fn initial(options: &StoreOptions<TFilter>) -> Self {
        Self {
            modal_open: false,
            form_mode: FormMode::View,
            selected_item: None,
            form_data: TData::default(),
            submitting: false,
            submit_error: None,
            items: Vec::new(),
            total_items: 0,
            total_pages: 0,
            current_page: 0,
            page_size: options.default_page_size,
            loading: false,
            error: None,
            selected_items: Vec::new(),
            selected_ids: Vec::new(),
            filters: options.default_filters.clone(),
            column_filters: Vec::new(),
            column_visibility: HashMap::new(),
            global_filter: String::new(),
            search_query: String::new(),
            search_column: options.default_search_column.clone(),
            sorting: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Row {
        id: u64,
    }

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Filter {
        city: Option<String>,
    }

    #[test]
    fn initial_state_reflects_options() {
        let options = StoreOptions::<Filter> {
            default_page_size: 50,
            default_search_column: "name".to_string(),
            default_filters: Filter {
                city: Some("Vienna".to_string()),
            },
            ..StoreOptions::default()
        };

        let state = EntityState::<Row, Filter>::initial(&options);
        assert_eq!(state.page_size, 50);
        assert_eq!(state.current_page, 0);
        assert_eq!(state.search_column, "name");
        assert_eq!(state.filters.city.as_deref(), Some("Vienna"));
        assert!(!state.modal_open);
        assert!(state.items.is_empty());
        assert!(state.selected_ids.is_empty());
    }
}
