//! Unified error types for ooedit.
//!
//! This module provides the single error type returned by every layer of the
//! editor, from package access up to the document writer.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, ErrorKind, Result};
