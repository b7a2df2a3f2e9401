//! Package members: one named entry of a document package.

/// Whether a member holds file content or only marks a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    File,
    Directory,
}

/// Compression applied to a member when the package is written as an archive.
///
/// Archive entries using any other method are rewritten deflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    Stored,
    #[default]
    Deflated,
}

/// A single entry of a document package, held fully in memory.
///
/// Besides the decompressed bytes, a member remembers the per-entry settings
/// it was read with so that writing the package back reproduces them.
#[derive(Debug, Clone)]
pub struct Member {
    name: String,
    kind: MemberKind,
    data: Vec<u8>,
    compression: Compression,
    last_modified: Option<zip::DateTime>,
    unix_mode: Option<u32>,
}

impl Member {
    /// Create a new file member with default write settings.
    pub fn file(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::File,
            data,
            compression: Compression::default(),
            last_modified: None,
            unix_mode: None,
        }
    }

    /// Create a directory marker member. The name always ends with `/`.
    pub fn directory(name: impl Into<String>) -> Self {
        let mut name = name.into();
        if !name.ends_with('/') {
            name.push('/');
        }
        Self {
            name,
            kind: MemberKind::Directory,
            data: Vec::new(),
            compression: Compression::Stored,
            last_modified: None,
            unix_mode: None,
        }
    }

    pub(crate) fn with_settings(
        mut self,
        compression: Compression,
        last_modified: Option<zip::DateTime>,
        unix_mode: Option<u32>,
    ) -> Self {
        self.compression = compression;
        self.last_modified = last_modified;
        self.unix_mode = unix_mode;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == MemberKind::Directory
    }

    /// The member's decompressed content. Empty for directory markers.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    #[inline]
    pub fn last_modified(&self) -> Option<zip::DateTime> {
        self.last_modified
    }

    #[inline]
    pub fn unix_mode(&self) -> Option<u32> {
        self.unix_mode
    }

    /// Replace the member's content, keeping its write settings.
    pub(crate) fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_name_gets_trailing_slash() {
        let dir = Member::directory("Data");
        assert_eq!(dir.name(), "Data/");
        assert!(dir.is_dir());
        assert!(dir.data().is_empty());
    }

    #[test]
    fn test_set_data_keeps_settings() {
        let mut member = Member::file("contents.xml", b"<outline/>".to_vec()).with_settings(
            Compression::Stored,
            None,
            Some(0o644),
        );
        member.set_data(b"<outline></outline>".to_vec());
        assert_eq!(member.compression(), Compression::Stored);
        assert_eq!(member.unix_mode(), Some(0o644));
        assert_eq!(member.data(), b"<outline></outline>");
    }
}
