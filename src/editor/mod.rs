//! Applying edit requests to documents on disk.
//!
//! [`EditRequest`] describes one edit, [`EditOptions`] holds user settings,
//! and [`DocumentWriter`] carries the edit out: preflight checks, loading,
//! metadata and text changes, verification, and the final atomic write.

mod options;
mod request;
mod writer;

pub use options::{DOCUMENT_EXTENSION, EditOptions};
pub use request::{
    EditRequest, EditRequestBuilder, MetadataEdit, MetadataMode, OutputMode, parse_assignment,
};
pub use writer::{DocumentWriter, Outcome, RunError, Stage};
