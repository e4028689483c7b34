//! Shared value types crossing the store and persistence boundaries.
//!
//! These types describe table ordering and per-column filtering in a way that
//! is independent of any concrete entity shape. They are deliberately small
//! records: the store transports them verbatim and never interprets them,
//! mirroring how query construction is the data layer's concern.

use serde::{Deserialize, Serialize};

/// Ordering direction for a single sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest value first.
    Ascending,
    /// Largest value first.
    Descending,
}

/// One entry of a table's sort order.
///
/// A table sorts by an ordered list of these specs; earlier entries take
/// precedence. The column name is whatever identifier the hosting table uses,
/// the store does not validate it against any schema.
///
/// # Examples
///
/// ```
/// use crudstore::SortSpec;
///
/// let spec = SortSpec::descending("created_at");
/// assert_eq!(spec.column, "created_at");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column identifier as known to the hosting table.
    pub column: String,

    /// Ordering direction for this column.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Creates a sort spec with an explicit direction.
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Creates an ascending sort spec.
    pub fn ascending(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Ascending)
    }

    /// Creates a descending sort spec.
    pub fn descending(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Descending)
    }
}

/// A filter bound to a single table column.
///
/// The value is an opaque JSON value so that text, numeric range, and
/// multi-select filters can all travel through the same slot. The store never
/// evaluates column filters; it only holds the list and resets pagination
/// when it changes.
///
/// # Examples
///
/// ```
/// use crudstore::ColumnFilter;
///
/// let filter = ColumnFilter::new("status", "active");
/// assert_eq!(filter.column, "status");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    /// Column identifier as known to the hosting table.
    pub column: String,

    /// Opaque filter value, interpreted by the data layer.
    pub value: serde_json::Value,
}

impl ColumnFilter {
    /// Creates a column filter from anything convertible to a JSON value.
    pub fn new(column: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_spec_constructors_set_direction() {
        assert_eq!(
            SortSpec::ascending("name").direction,
            SortDirection::Ascending
        );
        assert_eq!(
            SortSpec::descending("name").direction,
            SortDirection::Descending
        );
    }

    #[test]
    fn sort_direction_serializes_lowercase() {
        let json = serde_json::to_string(&SortSpec::ascending("name")).unwrap();
        assert!(json.contains("\"ascending\""));
    }

    #[test]
    fn column_filter_accepts_heterogeneous_values() {
        let text = ColumnFilter::new("status", "active");
        let number = ColumnFilter::new("amount", 42);
        assert_eq!(text.value, serde_json::json!("active"));
        assert_eq!(number.value, serde_json::json!(42));
    }

    #[test]
    fn column_filter_round_trips_through_json() {
        let filter = ColumnFilter::new("tags", serde_json::json!(["a", "b"]));
        let json = serde_json::to_string(&filter).unwrap();
        let back: ColumnFilter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, filter);
    }
}
