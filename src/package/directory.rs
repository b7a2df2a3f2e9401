//! Package directories: the unzipped form of a document package.

use super::member::Member;
use crate::common::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Read every file and subdirectory below `root` as package members.
///
/// Entries are visited depth-first in file-name order so that loading the same
/// directory twice always yields the same member order. Symbolic links are
/// not part of the package format and are skipped.
pub(crate) fn read_members(root: &Path) -> Result<Vec<Member>> {
    let mut members = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::access(root, e))?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| Error::access(entry.path(), e))?;
        let name = member_name(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            members.push(Member::directory(name));
        } else if file_type.is_file() {
            let data = fs::read(entry.path()).map_err(|e| Error::access(entry.path(), e))?;
            members.push(Member::file(name, data));
        } else {
            warn!("skipping non-regular entry {}", entry.path().display());
        }
    }

    Ok(members)
}

/// Materialize members below `root`, creating subdirectories as needed.
pub(crate) fn write_members(root: &Path, members: &[Member]) -> Result<()> {
    for member in members {
        let relative = member_path(member.name()).ok_or_else(|| {
            Error::write(root, format!("unsafe member name {:?}", member.name()))
        })?;
        let path = root.join(relative);

        if member.is_dir() {
            fs::create_dir_all(&path).map_err(|e| Error::write(&path, e))?;
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
            }
            fs::write(&path, member.data()).map_err(|e| Error::write(&path, e))?;
        }
    }
    Ok(())
}

fn member_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Map a member name to a relative path, refusing anything that would escape
/// the package root.
fn member_path(name: &str) -> Option<PathBuf> {
    let trimmed = name.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let path = PathBuf::from(trimmed);
    path.components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_path_rejects_traversal() {
        assert_eq!(member_path("contents.xml"), Some(PathBuf::from("contents.xml")));
        assert_eq!(member_path("Data/"), Some(PathBuf::from("Data")));
        assert_eq!(member_path("../outside.xml"), None);
        assert_eq!(member_path("/etc/passwd"), None);
        assert_eq!(member_path(""), None);
    }

    #[test]
    fn test_write_then_read_tree() {
        let dir = tempfile::tempdir().unwrap();
        let members = vec![
            Member::file("contents.xml", b"<outline/>".to_vec()),
            Member::directory("Data"),
            Member::file("Data/a.txt", b"a".to_vec()),
            Member::directory("Empty"),
        ];
        write_members(dir.path(), &members).unwrap();

        let read = read_members(dir.path()).unwrap();
        let names: Vec<&str> = read.iter().map(Member::name).collect();
        assert_eq!(names, ["Data/", "Data/a.txt", "Empty/", "contents.xml"]);
        assert_eq!(read[1].data(), b"a");
    }
}
