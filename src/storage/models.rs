//! Persistence envelope for the durable subset of store state.
//!
//! This module defines the record written to a [`PersistenceBackend`]: a
//! versioned envelope around exactly the four fields that survive restarts.
//! Keeping the envelope separate from the live state container draws a clear
//! boundary between the storage representation and the store itself, and
//! makes "nothing else is ever persisted" a type-level fact.
//!
//! [`PersistenceBackend`]: crate::storage::PersistenceBackend

use crate::domain::model::SortSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current version of the persisted envelope format.
pub const PERSIST_VERSION: u32 = 1;

/// Formats the durable-storage key for a store id.
///
/// Every store persists under `entity-store-{store_id}`. Store ids double as
/// key stems for file-based backends, so they should stay path-safe.
///
/// # Examples
///
/// ```
/// use crudstore::storage::persist_key;
///
/// assert_eq!(persist_key("customers"), "entity-store-customers");
/// ```
#[must_use]
pub fn persist_key(store_id: &str) -> String {
    format!("entity-store-{store_id}")
}

/// The durable subset of a store's state.
///
/// Contains exactly `page_size`, `column_visibility`, `filters`, and
/// `sorting`, plus a format version tag for future migrations. Table rows,
/// selection, and modal state are session state and never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState<TFilter> {
    /// Version of the envelope format.
    pub version: u32,

    /// Rows shown per table page.
    pub page_size: u64,

    /// Per-column visibility toggles.
    #[serde(default)]
    pub column_visibility: HashMap<String, bool>,

    /// Entity-specific filter object.
    pub filters: TFilter,

    /// Ordered sort specification.
    #[serde(default)]
    pub sorting: Vec<SortSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SortSpec;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Filter {
        status: Option<String>,
    }

    #[test]
    fn persist_key_uses_store_id() {
        assert_eq!(persist_key("calls"), "entity-store-calls");
    }

    #[test]
    fn envelope_round_trips() {
        let envelope = PersistedState {
            version: PERSIST_VERSION,
            page_size: 50,
            column_visibility: HashMap::from([("email".to_string(), false)]),
            filters: Filter {
                status: Some("active".to_string()),
            },
            sorting: vec![SortSpec::descending("created_at")],
        };

        let json = serde_json::to_string(&envelope).unwrap();
        let back: PersistedState<Filter> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, envelope);
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let json = r#"{"version":1,"page_size":10,"filters":{"status":null}}"#;
        let envelope: PersistedState<Filter> = serde_json::from_str(json).unwrap();
        assert!(envelope.column_visibility.is_empty());
        assert!(envelope.sorting.is_empty());
    }
}
