//! OmniOutliner document model.
//!
//! Only the two members this crate edits are modelled: the outline XML in
//! `contents.xml`, whose text runs receive placeholder substitution, and the
//! property list in `metadata.xml` that backs the document inspector. Every
//! other member is carried through untouched by [`crate::package`].
//!
//! # Example
//!
//! ```no_run
//! use ooedit::outline::Document;
//! use ooedit::substitution::{SubstitutionMap, TokenSyntax};
//!
//! let mut doc = Document::load("plan.ooutline")?;
//! doc.metadata_mut().upsert("kMDItemSubject", "Quarterly plan")?;
//!
//! let map: SubstitutionMap = [("project", "Alpha")].into_iter().collect();
//! let replaced = doc.substitute(&TokenSyntax::braces(), &map)?;
//! println!("{} tokens replaced", replaced);
//!
//! doc.finish()?.save("plan.ooutline", None)?;
//! # Ok::<(), ooedit::Error>(())
//! ```

pub mod contents;
mod document;
pub mod fields;
pub mod metadata;

pub use contents::{CONTENTS_MEMBER, Rewritten, TextNode};
pub use document::Document;
pub use fields::{Field, FieldKind};
pub use metadata::{METADATA_MEMBER, MetadataStore, MetadataValue};
