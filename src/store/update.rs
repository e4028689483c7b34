//! Field-diffed partial updates.
//!
//! Every action computes a [`StateUpdate`]: one optional slot per state
//! field, set only where the new value actually differs from the current
//! one. The gate skips empty partials outright, so subscribers are never
//! notified about a mutation that changed nothing, and the diagnostic log
//! line for an accepted mutation shows exactly the fields it touched.

use crate::domain::model::{ColumnFilter, SortSpec};
use crate::store::modes::FormMode;
use crate::store::state::EntityState;
use std::collections::HashMap;
use std::fmt;

/// Returns `Some(next)` when it differs from `current`, `None` otherwise.
///
/// Structural equality decides the difference, matching the store's
/// no-op-suppression contract.
pub(crate) fn diff<T: PartialEq>(current: &T, next: T) -> Option<T> {
    if *current == next {
        None
    } else {
        Some(next)
    }
}

/// Partial update over [`EntityState`].
///
/// `None` means "leave the field alone". Nullable state fields use a nested
/// option, so `Some(None)` clears them.
pub(crate) struct StateUpdate<TData, TFilter> {
    pub modal_open: Option<bool>,
    pub form_mode: Option<FormMode>,
    pub selected_item: Option<Option<TData>>,
    pub form_data: Option<TData>,
    pub submitting: Option<bool>,
    pub submit_error: Option<Option<String>>,
    pub items: Option<Vec<TData>>,
    pub total_items: Option<u64>,
    pub total_pages: Option<u64>,
    pub current_page: Option<u64>,
    pub page_size: Option<u64>,
    pub loading: Option<bool>,
    pub error: Option<Option<String>>,
    pub selected_items: Option<Vec<TData>>,
    pub selected_ids: Option<Vec<String>>,
    pub filters: Option<TFilter>,
    pub column_filters: Option<Vec<ColumnFilter>>,
    pub column_visibility: Option<HashMap<String, bool>>,
    pub global_filter: Option<String>,
    pub search_query: Option<String>,
    pub search_column: Option<String>,
    pub sorting: Option<Vec<SortSpec>>,
}

impl<TData, TFilter> StateUpdate<TData, TFilter> {
    /// A partial that touches nothing.
    pub fn empty() -> Self {
        Self {
            modal_open: None,
            form_mode: None,
            selected_item: None,
            form_data: None,
            submitting: None,
            submit_error: None,
            items: None,
            total_items: None,
            total_pages: None,
            current_page: None,
            page_size: None,
            loading: None,
            error: None,
            selected_items: None,
            selected_ids: None,
            filters: None,
            column_filters: None,
            column_visibility: None,
            global_filter: None,
            search_query: None,
            search_column: None,
            sorting: None,
        }
    }

    /// Whether the partial touches no field at all.
    pub fn is_empty(&self) -> bool {
        self.modal_open.is_none()
            && self.form_mode.is_none()
            && self.selected_item.is_none()
            && self.form_data.is_none()
            && self.submitting.is_none()
            && self.submit_error.is_none()
            && self.items.is_none()
            && self.total_items.is_none()
            && self.total_pages.is_none()
            && self.current_page.is_none()
            && self.page_size.is_none()
            && self.loading.is_none()
            && self.error.is_none()
            && self.selected_items.is_none()
            && self.selected_ids.is_none()
            && self.filters.is_none()
            && self.column_filters.is_none()
            && self.column_visibility.is_none()
            && self.global_filter.is_none()
            && self.search_query.is_none()
            && self.search_column.is_none()
            && self.sorting.is_none()
    }

    /// Merges the partial into `state`, consuming it.
    pub fn apply(self, state: &mut EntityState<TData, TFilter>) {
        if let Some(v) = self.modal_open {
            state.modal_open = v;
        }
        if let Some(v) = self.form_mode {
            state.form_mode = v;
        }
        if let Some(v) = self.selected_item {
            state.selected_item = v;
        }
        if let Some(v) = self.form_data {
            state.form_data = v;
        }
        if let Some(v) = self.submitting {
            state.submitting = v;
        }
        if let Some(v) = self.submit_error {
            state.submit_error = v;
        }
        if let Some(v) = self.items {
            state.items = v;
        }
        if let Some(v) = self.total_items {
            state.total_items = v;
        }
        if let Some(v) = self.total_pages {
            state.total_pages = v;
        }
        if let Some(v) = self.current_page {
            state.current_page = v;
        }
        if let Some(v) = self.page_size {
            state.page_size = v;
        }
        if let Some(v) = self.loading {
            state.loading = v;
        }
        if let Some(v) = self.error {
            state.error = v;
        }
        if let Some(v) = self.selected_items {
            state.selected_items = v;
        }
        if let Some(v) = self.selected_ids {
            state.selected_ids = v;
        }
        if let Some(v) = self.filters {
            state.filters = v;
        }
        if let Some(v) = self.column_filters {
            state.column_filters = v;
        }
        if let Some(v) = self.column_visibility {
            state.column_visibility = v;
        }
        if let Some(v) = self.global_filter {
            state.global_filter = v;
        }
        if let Some(v) = self.search_query {
            state.search_query = v;
        }
        if let Some(v) = self.search_column {
            state.search_column = v;
        }
        if let Some(v) = self.sorting {
            state.sorting = v;
        }
    }
}

impl<TData, TFilter> StateUpdate<TData, TFilter>
where
    TData: Clone + PartialEq,
    TFilter: Clone + PartialEq,
{
    /// Diffs every field of `target` against `current`.
    ///
    /// Used by full resets, where the target is the construction-default
    /// state and only the fields that drifted need rewriting.
    pub fn diff_states(
        current: &EntityState<TData, TFilter>,
        target: &EntityState<TData, TFilter>,
    ) -> Self {
        Self {
            modal_open: diff(&current.modal_open, target.modal_open),
            form_mode: diff(&current.form_mode, target.form_mode),
            selected_item: diff(&current.selected_item, target.selected_item.clone()),
            form_data: diff(&current.form_data, target.form_data.clone()),
            submitting: diff(&current.submitting, target.submitting),
            submit_error: diff(&current.submit_error, target.submit_error.clone()),
            items: diff(&current.items, target.items.clone()),
            total_items: diff(&current.total_items, target.total_items),
            total_pages: diff(&current.total_pages, target.total_pages),
            current_page: diff(&current.current_page, target.current_page),
            page_size: diff(&current.page_size, target.page_size),
            loading: diff(&current.loading, target.loading),
            error: diff(&current.error, target.error.clone()),
            selected_items: diff(&current.selected_items, target.selected_items.clone()),
            selected_ids: diff(&current.selected_ids, target.selected_ids.clone()),
            filters: diff(&current.filters, target.filters.clone()),
            column_filters: diff(&current.column_filters, target.column_filters.clone()),
            column_visibility: diff(&current.column_visibility, target.column_visibility.clone()),
            global_filter: diff(&current.global_filter, target.global_filter.clone()),
            search_query: diff(&current.search_query, target.search_query.clone()),
            search_column: diff(&current.search_column, target.search_column.clone()),
            sorting: diff(&current.sorting, target.sorting.clone()),
        }
    }
}

impl<TData, TFilter> fmt::Debug for StateUpdate<TData, TFilter>
where
    TData: fmt::Debug,
    TFilter: fmt::Debug,
{
    /// Shows only the fields the partial touches.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("StateUpdate");
        if let Some(v) = &self.modal_open {
            s.field("modal_open", v);
        }
        if let Some(v) = &self.form_mode {
            s.field("form_mode", v);
        }
        if let Some(v) = &self.selected_item {
            s.field("selected_item", v);
        }
        if let Some(v) = &self.form_data {
            s.field("form_data", v);
        }
        if let Some(v) = &self.submitting {
            s.field("submitting", v);
        }
        if let Some(v) = &self.submit_error {
            s.field("submit_error", v);
        }
        if let Some(v) = &self.items {
            s.field("items", v);
        }
        if let Some(v) = &self.total_items {
            s.field("total_items", v);
        }
        if let Some(v) = &self.total_pages {
            s.field("total_pages", v);
        }
        if let Some(v) = &self.current_page {
            s.field("current_page", v);
        }
        if let Some(v) = &self.page_size {
            s.field("page_size", v);
        }
        if let Some(v) = &self.loading {
            s.field("loading", v);
        }
        if let Some(v) = &self.error {
            s.field("error", v);
        }
        if let Some(v) = &self.selected_items {
            s.field("selected_items", v);
        }
        if let Some(v) = &self.selected_ids {
            s.field("selected_ids", v);
        }
        if let Some(v) = &self.filters {
            s.field("filters", v);
        }
        if let Some(v) = &self.column_filters {
            s.field("column_filters", v);
        }
        if let Some(v) = &self.column_visibility {
            s.field("column_visibility", v);
        }
        if let Some(v) = &self.global_filter {
            s.field("global_filter", v);
        }
        if let Some(v) = &self.search_query {
            s.field("search_query", v);
        }
        if let Some(v) = &self.search_column {
            s.field("search_column", v);
        }
        if let Some(v) = &self.sorting {
            s.field("sorting", v);
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreOptions;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Row {
        id: u64,
    }

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Filter {
        status: Option<String>,
    }

    fn initial() -> EntityState<Row, Filter> {
        EntityState::initial(&StoreOptions::default())
    }

    #[test]
    fn diff_suppresses_equal_values() {
        assert_eq!(diff(&5u64, 5), None);
        assert_eq!(diff(&5u64, 6), Some(6));
    }

    #[test]
    fn empty_partial_reports_empty() {
        let update = StateUpdate::<Row, Filter>::empty();
        assert!(update.is_empty());
    }

    #[test]
    fn apply_merges_only_set_fields() {
        let mut state = initial();
        state.current_page = 3;

        let update = StateUpdate::<Row, Filter> {
            page_size: Some(25),
            current_page: Some(0),
            ..StateUpdate::empty()
        };
        update.apply(&mut state);

        assert_eq!(state.page_size, 25);
        assert_eq!(state.current_page, 0);
        assert!(!state.modal_open);
    }

    #[test]
    fn nested_option_clears_nullable_fields() {
        let mut state = initial();
        state.submit_error = Some("boom".to_string());

        let update = StateUpdate::<Row, Filter> {
            submit_error: Some(None),
            ..StateUpdate::empty()
        };
        assert!(!update.is_empty());
        update.apply(&mut state);

        assert_eq!(state.submit_error, None);
    }

    #[test]
    fn diff_states_is_empty_for_identical_states() {
        let state = initial();
        assert!(StateUpdate::diff_states(&state, &state).is_empty());
    }

    #[test]
    fn diff_states_covers_drifted_fields() {
        let target = initial();
        let mut current = initial();
        current.page_size = 50;
        current.search_query = "acme".to_string();
        current.selected_ids = vec!["5".to_string()];

        let update = StateUpdate::diff_states(&current, &target);
        assert_eq!(update.page_size, Some(10));
        assert_eq!(update.search_query, Some(String::new()));
        assert_eq!(update.selected_ids, Some(vec![]));
        assert!(update.modal_open.is_none());
    }

    #[test]
    fn debug_output_lists_only_touched_fields() {
        let update = StateUpdate::<Row, Filter> {
            current_page: Some(0),
            ..StateUpdate::empty()
        };
        let rendered = format!("{update:?}");
        assert!(rendered.contains("current_page"));
        assert!(!rendered.contains("page_size"));
    }
}
