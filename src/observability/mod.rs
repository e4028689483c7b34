//! Structured logging for store diagnostics.
//!
//! Every layer of the crate emits through the `tracing` macros: accepted
//! mutations at debug level with their action name and applied partial,
//! gate drops and no-op skips at trace level, persistence failures as
//! warnings. This module only provides subscriber setup for hosts that want
//! those lines on screen or on disk without wiring `tracing-subscriber`
//! themselves.
//!
//! # Configuration
//!
//! The filter level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. The explicit level argument
//! 3. Default: `"info"`
//!
//! # Modules
//!
//! - [`init`]: tracing initialization and subscriber setup

pub mod init;

pub use init::{init_tracing, init_tracing_to_file};
