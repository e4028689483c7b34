//! Error types for the crudstore crate.
//!
//! This module defines the centralized error type [`StoreError`] and a type alias
//! [`Result`] for convenient error handling throughout the crate. All errors are
//! implemented using the `thiserror` crate for automatic `Error` trait implementation.
//!
//! Mutator actions on a store never fail; errors surface only from the edges
//! that perform I/O or parsing: persistence backends, profile files, and the
//! store registry.

use thiserror::Error;

/// The main error type for crudstore operations.
///
/// This enum consolidates the error conditions that can occur at the crate's
/// boundaries: loading and writing persisted state, parsing configuration, and
/// resolving stores from the registry. Variants wrapping underlying errors from
/// external crates use `#[from]` for automatic conversion.
///
/// # Examples
///
/// ```
/// use crudstore::{Result, StoreError};
///
/// fn validate_profile() -> Result<()> {
///     Err(StoreError::Config("missing [stores] table".to_string()))
/// }
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// Persistence operation failed.
    ///
    /// Occurs when reading from or writing to a persistence backend fails,
    /// including serialization of the persisted envelope. The string contains
    /// a description of what went wrong.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    ///
    /// Wraps errors from standard library I/O operations. Automatically converts
    /// from `std::io::Error` using the `#[from]` attribute.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or missing.
    ///
    /// Occurs when a store-profile file cannot be parsed or contains malformed
    /// values. The string describes the specific configuration problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A registered store was requested under different type parameters.
    ///
    /// Each store id maps to exactly one instance; asking the registry for an
    /// existing id with a different data or filter type is a caller bug and is
    /// reported rather than silently creating a second instance.
    #[error("Store '{0}' is registered under different type parameters")]
    StoreTypeMismatch(String),
}

/// A specialized `Result` type for crudstore operations.
///
/// This is a type alias for `std::result::Result<T, StoreError>` that simplifies
/// function signatures throughout the codebase.
///
/// # Examples
///
/// ```
/// use crudstore::Result;
///
/// fn load_profiles() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, StoreError>;
