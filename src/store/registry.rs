//! One-instance-per-id store registry.
//!
//! Hosts that generate dozens of entity screens need exactly one store per
//! screen, reachable from anywhere in the application. Module-level
//! singletons would couple that guarantee to initialization order; the
//! registry makes it explicit instead: stores are created once, keyed by
//! their id, and handed out as shared references.
//!
//! Stores of different entity types live in the same registry. The entries
//! are type-erased internally and checked on the way out, so asking for an
//! existing id under the wrong type parameters is reported as an error
//! rather than silently minting a second instance.

use crate::domain::error::{Result, StoreError};
use crate::store::EntityStore;
use crate::StoreOptions;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of shared [`EntityStore`] instances keyed by store id.
///
/// # Examples
///
/// ```
/// use crudstore::{StoreOptions, StoreRegistry};
///
/// #[derive(Clone, Debug, Default, PartialEq)]
/// struct Group { id: u64 }
///
/// #[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// struct GroupFilter { name: Option<String> }
///
/// let registry = StoreRegistry::new();
/// let first = registry
///     .get_or_create::<Group, GroupFilter>("groups", StoreOptions::default)?;
/// let second = registry
///     .get_or_create::<Group, GroupFilter>("groups", StoreOptions::default)?;
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// # Ok::<(), crudstore::StoreError>(())
/// ```
#[derive(Default)]
pub struct StoreRegistry {
    stores: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl StoreRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the store registered under `store_id`, creating it from
    /// `options` on first use.
    ///
    /// The options closure is only evaluated when the store does not exist
    /// yet, so repeated lookups stay cheap.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreTypeMismatch`] when `store_id` already
    /// maps to a store of different type parameters.
    pub fn get_or_create<TData, TFilter>(
        &self,
        store_id: &str,
        options: impl FnOnce() -> StoreOptions<TFilter>,
    ) -> Result<Arc<EntityStore<TData, TFilter>>>
    where
        TData: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static,
        TFilter:
            Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let mut stores = self
            .stores
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = stores.get(store_id) {
            return downcast(store_id, existing);
        }

        tracing::debug!(store_id = %store_id, "registering new entity store");
        let store = Arc::new(EntityStore::new(store_id, options()));
        stores.insert(store_id.to_string(), store.clone());
        Ok(store)
    }

    /// Returns the store registered under `store_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreTypeMismatch`] when the id exists but was
    /// registered under different type parameters.
    pub fn get<TData, TFilter>(
        &self,
        store_id: &str,
    ) -> Result<Option<Arc<EntityStore<TData, TFilter>>>>
    where
        TData: Send + Sync + 'static,
        TFilter: Send + Sync + 'static,
    {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        match stores.get(store_id) {
            Some(existing) => downcast(store_id, existing).map(Some),
            None => Ok(None),
        }
    }

    /// Whether a store is registered under `store_id`, of any type.
    #[must_use]
    pub fn contains(&self, store_id: &str) -> bool {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(store_id)
    }

    /// Ids of all registered stores, in no particular order.
    #[must_use]
    pub fn store_ids(&self) -> Vec<String> {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

fn downcast<TData, TFilter>(
    store_id: &str,
    entry: &Arc<dyn Any + Send + Sync>,
) -> Result<Arc<EntityStore<TData, TFilter>>>
where
    TData: Send + Sync + 'static,
    TFilter: Send + Sync + 'static,
{
    entry
        .clone()
        .downcast::<EntityStore<TData, TFilter>>()
        .map_err(|_| StoreError::StoreTypeMismatch(store_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Call {
        id: u64,
    }

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct CallFilter {
        outcome: Option<String>,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Meeting {
        id: u64,
    }

    #[test]
    fn same_id_returns_same_instance() {
        let registry = StoreRegistry::new();
        let first = registry
            .get_or_create::<Call, CallFilter>("calls", StoreOptions::default)
            .unwrap();
        let second = registry
            .get_or_create::<Call, CallFilter>("calls", StoreOptions::default)
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.store_ids(), vec!["calls".to_string()]);
    }

    #[test]
    fn state_is_shared_through_the_registry() {
        let registry = StoreRegistry::new();
        let first = registry
            .get_or_create::<Call, CallFilter>("calls", StoreOptions::default)
            .unwrap();
        first.set_page_size(50);

        let second = registry
            .get_or_create::<Call, CallFilter>("calls", StoreOptions::default)
            .unwrap();
        assert_eq!(second.table_state().page_size, 50);
    }

    #[test]
    fn different_ids_create_distinct_stores() {
        let registry = StoreRegistry::new();
        let calls = registry
            .get_or_create::<Call, CallFilter>("calls", StoreOptions::default)
            .unwrap();
        let archived = registry
            .get_or_create::<Call, CallFilter>("calls-archived", StoreOptions::default)
            .unwrap();

        calls.set_page_size(50);
        assert_eq!(archived.table_state().page_size, 10);
    }

    #[test]
    fn type_mismatch_is_reported_not_silently_replaced() {
        let registry = StoreRegistry::new();
        registry
            .get_or_create::<Call, CallFilter>("calls", StoreOptions::default)
            .unwrap();

        let result = registry.get_or_create::<Meeting, CallFilter>("calls", StoreOptions::default);
        assert!(matches!(result, Err(StoreError::StoreTypeMismatch(id)) if id == "calls"));
    }

    #[test]
    fn get_distinguishes_missing_from_mismatched() {
        let registry = StoreRegistry::new();
        assert!(registry
            .get::<Call, CallFilter>("calls")
            .unwrap()
            .is_none());

        registry
            .get_or_create::<Call, CallFilter>("calls", StoreOptions::default)
            .unwrap();
        assert!(registry.get::<Call, CallFilter>("calls").unwrap().is_some());
        assert!(registry.get::<Meeting, CallFilter>("calls").is_err());
        assert!(registry.contains("calls"));
        assert!(!registry.contains("meetings"));
    }
}
