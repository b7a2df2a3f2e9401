//! An OmniOutliner document: a package plus its content and metadata members.

use super::contents::{self, CONTENTS_MEMBER};
use super::metadata::{METADATA_MEMBER, MetadataStore};
use crate::common::{Error, Result};
use crate::package::Package;
use crate::substitution::{SubstitutionMap, TokenSyntax};
use std::path::Path;
use tracing::debug;

/// A loaded document, editable in memory.
///
/// Edits are tracked per member. [`finish`](Self::finish) re-encodes only the
/// members that actually changed, so everything else keeps its exact bytes.
#[derive(Debug, Clone)]
pub struct Document {
    package: Package,
    metadata: MetadataStore,
    contents_changed: bool,
}

impl Document {
    /// Open the document at `path`.
    ///
    /// # Errors
    ///
    /// [`Error::Access`] if the package cannot be opened, [`Error::Format`] if
    /// it does not hold a readable outline.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(Package::load(path)?)
    }

    /// Interpret an already loaded package as a document.
    pub fn from_package(package: Package) -> Result<Self> {
        let member = package.member(CONTENTS_MEMBER).ok_or_else(|| {
            Error::Format(format!("package has no {} member", CONTENTS_MEMBER))
        })?;
        contents::validate(member.data())?;

        let metadata = match package.member(METADATA_MEMBER) {
            Some(member) => MetadataStore::from_plist(member.data())?,
            None => {
                debug!("no {} member, starting with empty metadata", METADATA_MEMBER);
                MetadataStore::new()
            },
        };

        Ok(Self {
            package,
            metadata,
            contents_changed: false,
        })
    }

    #[inline]
    pub fn package(&self) -> &Package {
        &self.package
    }

    #[inline]
    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    #[inline]
    pub fn metadata_mut(&mut self) -> &mut MetadataStore {
        &mut self.metadata
    }

    /// Raw bytes of the content member.
    pub fn contents(&self) -> &[u8] {
        self.package
            .member(CONTENTS_MEMBER)
            .map(|m| m.data())
            .unwrap_or_default()
    }

    /// Replace placeholder tokens in the outline text.
    ///
    /// Returns the number of tokens replaced.
    pub fn substitute(&mut self, syntax: &TokenSyntax, map: &SubstitutionMap) -> Result<usize> {
        if map.is_empty() {
            return Ok(0);
        }
        match contents::substitute_text_nodes(self.contents(), syntax, map)? {
            Some(rewritten) => {
                self.package.put(CONTENTS_MEMBER, rewritten.bytes);
                self.contents_changed = true;
                Ok(rewritten.replacements)
            },
            None => Ok(0),
        }
    }

    /// Placeholder keys present in the outline text.
    pub fn placeholders(&self, syntax: &TokenSyntax) -> Result<Vec<String>> {
        contents::placeholders(self.contents(), syntax)
    }

    /// Whether any member differs from what was loaded.
    pub fn is_modified(&self) -> bool {
        self.contents_changed || self.metadata.is_dirty()
    }

    /// Write pending edits into the package and check the result.
    ///
    /// Changed members are parsed again before the package is handed back; a
    /// document that would not load after saving is never returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if a changed member no longer parses.
    pub fn finish(mut self) -> Result<Package> {
        if self.metadata.is_dirty() {
            let bytes = self.metadata.to_plist()?;
            if self.package.put(METADATA_MEMBER, bytes) {
                debug!("created {} member", METADATA_MEMBER);
            }
            if let Some(member) = self.package.member(METADATA_MEMBER) {
                MetadataStore::from_plist(member.data())?;
            }
        }
        if self.contents_changed {
            contents::validate(self.contents())?;
        }
        Ok(self.package)
    }
}
