//! Document package access.
//!
//! An OmniOutliner document is a package of named members, stored either as a
//! single zip archive or as a directory. This module loads every member into
//! memory, lets the layers above replace individual members, and writes the
//! package back in the same container format.
//!
//! # Example
//!
//! ```no_run
//! use ooedit::package::Package;
//!
//! let mut package = Package::load("plan.ooutline")?;
//! for name in package.names() {
//!     println!("{}", name);
//! }
//! package.put("contents.xml", b"<outline/>".to_vec());
//! package.save("copy.ooutline", None)?;
//! # Ok::<(), ooedit::Error>(())
//! ```

mod archive;
mod directory;
mod member;
mod write;

pub use member::{Compression, Member, MemberKind};

use crate::common::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

pub(crate) use write::existing_parent;

/// Container format of a package on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// A single zip file
    Archive,
    /// A directory tree (OmniOutliner's "package" file format option)
    Directory,
}

/// An ordered collection of package members held in memory.
#[derive(Debug, Clone)]
pub struct Package {
    kind: PackageKind,
    members: Vec<Member>,
    // Mode of the loaded source, applied to new destinations
    permissions: Option<fs::Permissions>,
}

impl Package {
    /// Create an empty package of the given kind.
    pub fn new(kind: PackageKind) -> Self {
        Self {
            kind,
            members: Vec::new(),
            permissions: None,
        }
    }

    /// Open the package at `path` and read all of its members.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Access`] if the path does not exist, cannot be read,
    /// or is a file that is not a zip archive.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|e| Error::access(path, e))?;

        if meta.is_dir() {
            debug!("reading package directory {}", path.display());
            let members = directory::read_members(path)?;
            return Ok(Self {
                kind: PackageKind::Directory,
                members,
                permissions: Some(meta.permissions()),
            });
        }

        debug!("reading package archive {}", path.display());
        let bytes = fs::read(path).map_err(|e| Error::access(path, e))?;
        let members = archive::read_members(&bytes)
            .map_err(|e| Error::access(path, format!("not a valid zip archive ({})", e)))?;
        debug!("read {} members", members.len());
        Ok(Self {
            kind: PackageKind::Archive,
            members,
            permissions: Some(meta.permissions()),
        })
    }

    /// Parse an archive package held in memory.
    pub fn from_archive_bytes(bytes: &[u8]) -> Result<Self> {
        let members = archive::read_members(bytes)
            .map_err(|e| Error::Format(format!("not a valid zip archive: {}", e)))?;
        Ok(Self {
            kind: PackageKind::Archive,
            members,
            permissions: None,
        })
    }

    /// Encode all members as a zip archive.
    pub fn to_archive_bytes(&self) -> Result<Vec<u8>> {
        archive::write_members(&self.members)
            .map_err(|e| Error::Format(format!("cannot encode archive: {}", e)))
    }

    /// Write the package to `dest` in its own container format.
    ///
    /// The destination is replaced atomically. When `backup` is given and
    /// `dest` already exists, the previous content is preserved at `backup`.
    /// An existing destination keeps its permissions; a new one gets those of
    /// the package's source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the destination directory is missing or the
    /// new content cannot be written.
    pub fn save<P: AsRef<Path>>(&self, dest: P, backup: Option<&Path>) -> Result<()> {
        let dest = dest.as_ref();
        debug!(
            "writing {} members to {} as {:?}",
            self.members.len(),
            dest.display(),
            self.kind
        );
        match self.kind {
            PackageKind::Archive => {
                let bytes = archive::write_members(&self.members)
                    .map_err(|e| Error::write(dest, e))?;
                write::replace_file(dest, &bytes, backup, self.permissions.as_ref())
            },
            PackageKind::Directory => write::replace_directory(
                dest,
                &self.members,
                backup,
                self.permissions.as_ref(),
            ),
        }
    }

    /// Permissions of the file or directory the package was loaded from.
    #[inline]
    pub fn source_permissions(&self) -> Option<&fs::Permissions> {
        self.permissions.as_ref()
    }

    #[inline]
    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    /// Number of members, directory markers included.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member names in package order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(Member::name)
    }

    #[inline]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Look up a file member by name. A leading `/` is ignored.
    pub fn member(&self, name: &str) -> Option<&Member> {
        let name = name.strip_prefix('/').unwrap_or(name);
        self.members
            .iter()
            .find(|m| !m.is_dir() && m.name() == name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.member(name).is_some()
    }

    /// Replace the content of member `name`, or append it as a new file member.
    ///
    /// Returns `true` when the member was newly created.
    pub fn put(&mut self, name: &str, data: Vec<u8>) -> bool {
        let name = name.strip_prefix('/').unwrap_or(name);
        match self
            .members
            .iter_mut()
            .find(|m| !m.is_dir() && m.name() == name)
        {
            Some(member) => {
                member.set_data(data);
                false
            },
            None => {
                self.members.push(Member::file(name, data));
                true
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;
    use crate::fixtures;

    #[test]
    fn test_load_missing_path_is_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Package::load(dir.path().join("missing.ooutline")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Access);
    }

    #[test]
    fn test_load_garbage_is_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.ooutline");
        fs::write(&path, b"this is not a zip").unwrap();
        let err = Package::load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Access);
    }

    #[test]
    fn test_round_trip_preserves_members() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixtures::write_archive(dir.path(), "plan.ooutline");
        let copy = dir.path().join("copy.ooutline");

        let original = Package::load(&source).unwrap();
        original.save(&copy, None).unwrap();
        let reloaded = Package::load(&copy).unwrap();

        assert_eq!(reloaded.kind(), PackageKind::Archive);
        assert_eq!(
            original.names().collect::<Vec<_>>(),
            reloaded.names().collect::<Vec<_>>()
        );
        for (a, b) in original.members().iter().zip(reloaded.members()) {
            assert_eq!(a.data(), b.data(), "member {} changed", a.name());
            assert_eq!(a.compression(), b.compression());
        }
    }

    #[test]
    fn test_directory_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = fixtures::write_directory(dir.path(), "plan.ooutline");
        let copy = dir.path().join("copy.ooutline");

        let original = Package::load(&source).unwrap();
        assert_eq!(original.kind(), PackageKind::Directory);
        original.save(&copy, None).unwrap();

        assert!(copy.is_dir());
        let reloaded = Package::load(&copy).unwrap();
        assert_eq!(
            original.names().collect::<Vec<_>>(),
            reloaded.names().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_put_replaces_or_appends() {
        let mut package = Package::from_archive_bytes(&fixtures::archive_bytes()).unwrap();
        let count = package.len();

        assert!(!package.put("contents.xml", b"<outline/>".to_vec()));
        assert_eq!(package.len(), count);
        assert_eq!(package.member("/contents.xml").unwrap().data(), b"<outline/>");

        assert!(package.put("extra.xml", b"<x/>".to_vec()));
        assert_eq!(package.len(), count + 1);
        assert_eq!(package.names().last(), Some("extra.xml"));
    }
}
