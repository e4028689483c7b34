//! TOML store profiles.
//!
//! Hosts with generated screens tend to have dozens of stores whose options
//! differ only in a handful of scalars. A store-profile file declares those
//! defaults in one place instead of scattering them across call sites:
//!
//! ```toml
//! version = 1
//!
//! [defaults]
//! page_size = 25
//! persist = true
//!
//! [stores.customers]
//! page_size = 50
//! search_column = "name"
//!
//! [stores.calls]
//! enable_logging = true
//! ```
//!
//! Resolution layers per-store entries over the file-wide `[defaults]`
//! table over the crate's built-in defaults. Fields a TOML scalar cannot
//! express (the filter object, backend, clock) are set in code after
//! resolution.

use crate::domain::error::{Result, StoreError};
use crate::StoreOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

fn default_version() -> u32 {
    1
}

/// One profile's worth of option overrides.
///
/// Every field is optional; absent fields defer to the next layer down.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileEntry {
    /// Overrides [`StoreOptions::default_page_size`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,

    /// Overrides [`StoreOptions::default_search_column`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_column: Option<String>,

    /// Overrides [`StoreOptions::persist`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist: Option<bool>,

    /// Overrides [`StoreOptions::enable_logging`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_logging: Option<bool>,

    /// Overrides [`StoreOptions::update_threshold_ms`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_threshold_ms: Option<i64>,
}

impl ProfileEntry {
    fn overlay<TFilter>(&self, options: &mut StoreOptions<TFilter>) {
        if let Some(page_size) = self.page_size {
            options.default_page_size = page_size;
        }
        if let Some(search_column) = &self.search_column {
            options.default_search_column.clone_from(search_column);
        }
        if let Some(persist) = self.persist {
            options.persist = persist;
        }
        if let Some(enable_logging) = self.enable_logging {
            options.enable_logging = enable_logging;
        }
        if let Some(threshold) = self.update_threshold_ms {
            options.update_threshold_ms = threshold;
        }
    }
}

/// Declarative per-entity store defaults loaded from TOML.
///
/// # Examples
///
/// ```
/// use crudstore::StoreProfiles;
///
/// #[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// struct Filter;
///
/// let profiles = StoreProfiles::from_toml(
///     r#"
///     [defaults]
///     page_size = 25
///
///     [stores.customers]
///     page_size = 50
///     "#,
/// )?;
///
/// assert_eq!(profiles.resolve::<Filter>("customers").default_page_size, 50);
/// assert_eq!(profiles.resolve::<Filter>("meetings").default_page_size, 25);
/// # Ok::<(), crudstore::StoreError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreProfiles {
    /// Version of the profile format for future migrations.
    #[serde(default = "default_version")]
    pub version: u32,

    /// File-wide overrides applied to every store.
    #[serde(default)]
    pub defaults: ProfileEntry,

    /// Per-store overrides keyed by store id.
    #[serde(default)]
    pub stores: HashMap<String, ProfileEntry>,
}

impl Default for StoreProfiles {
    fn default() -> Self {
        Self {
            version: default_version(),
            defaults: ProfileEntry::default(),
            stores: HashMap::new(),
        }
    }
}

impl StoreProfiles {
    /// Parses profiles from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] when the document is not valid TOML or
    /// does not match the profile schema.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| StoreError::Config(format!("failed to parse store profiles: {e}")))
    }

    /// Loads profiles from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file cannot be read and
    /// [`StoreError::Config`] when it cannot be parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = ?path, "loading store profiles");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Resolves the options for `store_id`.
    ///
    /// Layering, later wins: built-in defaults, the `[defaults]` table, the
    /// `[stores.<store_id>]` entry. Unknown ids simply resolve to the first
    /// two layers.
    #[must_use]
    pub fn resolve<TFilter: Default>(&self, store_id: &str) -> StoreOptions<TFilter> {
        let mut options = StoreOptions::default();
        self.defaults.overlay(&mut options);
        if let Some(entry) = self.stores.get(store_id) {
            entry.overlay(&mut options);
        }
        options
    }
}
