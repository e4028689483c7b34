//! Slice projections over [`EntityState`].
//!
//! Observers rarely need the whole record: a form component cares about the
//! modal, a table about its rows and pagination, a toolbar about filters.
//! These projections carve the state into its three read-side slices so a
//! subscriber can compare just the slice it renders and skip unrelated
//! changes.
//!
//! Each projection is a pure function of a state snapshot and contains a
//! fixed subset of fields; nothing here can drift from the store because
//! there is nothing to keep in sync, only fields to copy.

use crate::domain::model::{ColumnFilter, SortSpec};
use crate::store::modes::FormMode;
use crate::store::state::EntityState;
use std::collections::HashMap;

/// Read-side view of the modal form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState<TData> {
    /// Whether the modal form is open.
    pub modal_open: bool,
    /// Presentation mode of the modal form.
    pub form_mode: FormMode,
    /// Record the form was opened on, if any.
    pub selected_item: Option<TData>,
    /// Working copy edited by the form.
    pub form_data: TData,
    /// Whether a submission is in flight.
    pub submitting: bool,
    /// Caller-supplied submission error.
    pub submit_error: Option<String>,
}

impl<TData: Clone> FormState<TData> {
    /// Projects the form slice out of a state snapshot.
    pub fn project<TFilter>(state: &EntityState<TData, TFilter>) -> Self {
        Self {
            modal_open: state.modal_open,
            form_mode: state.form_mode,
            selected_item: state.selected_item.clone(),
            form_data: state.form_data.clone(),
            submitting: state.submitting,
            submit_error: state.submit_error.clone(),
        }
    }
}

/// Read-side view of the paginated table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableState<TData> {
    /// Rows of the currently loaded page.
    pub items: Vec<TData>,
    /// Total row count across all pages.
    pub total_items: u64,
    /// Total page count.
    pub total_pages: u64,
    /// Zero-based current page index.
    pub current_page: u64,
    /// Rows per page.
    pub page_size: u64,
    /// Whether the table is loading.
    pub loading: bool,
    /// Caller-supplied load error.
    pub error: Option<String>,
}

impl<TData: Clone> TableState<TData> {
    /// Projects the table slice out of a state snapshot.
    pub fn project<TFilter>(state: &EntityState<TData, TFilter>) -> Self {
        Self {
            items: state.items.clone(),
            total_items: state.total_items,
            total_pages: state.total_pages,
            current_page: state.current_page,
            page_size: state.page_size,
            loading: state.loading,
            error: state.error.clone(),
        }
    }
}

/// Read-side view of the filter/sort stack.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState<TFilter> {
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

impl<TFilter: Clone> FilterState<TFilter> {
    /// Projects the filter slice out of a state snapshot.
    pub fn project<TData>(state: &EntityState<TData, TFilter>) -> Self {
        Self {
            filters: state.filters.clone(),
            column_filters: state.column_filters.clone(),
            column_visibility: state.column_visibility.clone(),
            global_filter: state.global_filter.clone(),
            search_query: state.search_query.clone(),
            search_column: state.search_column.clone(),
            sorting: state.sorting.clone(),
        }
    }
}
