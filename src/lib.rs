//! ooedit - Edit OmniOutliner 5 documents without OmniOutliner
//!
//! An OmniOutliner document (`.ooutline`) is a zip archive, or a package
//! directory, holding the outline as XML in `contents.xml` and the document
//! inspector's fields as a property list in `metadata.xml`. This library opens
//! such packages, edits those two members, and writes the package back while
//! leaving every other member byte-for-byte intact.
//!
//! # Features
//!
//! - **Metadata**: set, replace or extend inspector fields such as Authors,
//!   Comments or Projects, including fields OmniOutliner does not script
//! - **Placeholders**: replace `{{key}}` tokens in the outline text, with
//!   values escaped for the XML they land in
//! - **Safe writes**: the destination is replaced atomically, optionally
//!   keeping the previous version as a backup
//!
//! # Example - Editing a document
//!
//! ```no_run
//! use ooedit::editor::{DocumentWriter, EditRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = EditRequest::builder("plan.ooutline")
//!     .metadata("Comments", "Reviewed")
//!     .substitute("project", "Alpha")
//!     .save_as("plan-alpha.ooutline")
//!     .build()?;
//!
//! let outcome = DocumentWriter::default().run(&request)?;
//! println!("{} placeholders replaced", outcome.replacements);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Reading metadata
//!
//! ```no_run
//! use ooedit::outline::Document;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = Document::load("plan.ooutline")?;
//! for (key, value) in doc.metadata().iter() {
//!     println!("{}: {}", key, value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod editor;
pub mod outline;
pub mod package;
pub mod substitution;

#[cfg(test)]
mod fixtures;

pub use common::{Error, ErrorKind, Result};
pub use editor::{DocumentWriter, EditOptions, EditRequest, Outcome, RunError};
pub use outline::{Document, MetadataStore, MetadataValue};
pub use package::{Package, PackageKind};
pub use substitution::{SubstitutionMap, TokenSyntax};
