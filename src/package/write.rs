//! Crash-safe replacement of files and package directories.
//!
//! New content is always staged next to the destination and moved into place
//! by a rename, so the destination holds either the old or the new document
//! and never a partial one.

use super::directory;
use super::member::Member;
use crate::common::{Error, Result};
use std::fs::{self, Permissions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const STAGING_PREFIX: &str = ".ooedit-";

/// Atomically replace (or create) the file at `dest` with `bytes`.
///
/// When `backup` is given and `dest` already exists, the current file is
/// copied there first. The new file takes the permissions of the file it
/// replaces, or `permissions` when `dest` does not exist yet.
pub(crate) fn replace_file(
    dest: &Path,
    bytes: &[u8],
    backup: Option<&Path>,
    permissions: Option<&Permissions>,
) -> Result<()> {
    let parent = existing_parent(dest)?;

    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(parent)
        .map_err(|e| Error::write(dest, e))?;
    staged.write_all(bytes).map_err(|e| Error::write(dest, e))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| Error::write(dest, e))?;

    let permissions = match fs::metadata(dest) {
        Ok(meta) if meta.is_file() => Some(meta.permissions()),
        _ => permissions.cloned(),
    };
    if let Some(permissions) = permissions {
        fs::set_permissions(staged.path(), permissions).map_err(|e| Error::write(dest, e))?;
    }

    if let Some(backup) = backup
        && dest.is_file()
    {
        debug!("backing up {} to {}", dest.display(), backup.display());
        fs::copy(dest, backup).map_err(|e| Error::write(backup, e))?;
    }

    persist(staged, dest)
}

fn persist(staged: NamedTempFile, dest: &Path) -> Result<()> {
    staged
        .persist(dest)
        .map(|_| ())
        .map_err(|e| Error::write(dest, e.error))
}

/// Atomically replace (or create) the package directory at `dest`.
///
/// The members are written into a staging directory beside `dest`, which is
/// then swapped in by rename. The previous directory becomes `backup` when one
/// is requested and is deleted otherwise. The package root takes the
/// permissions of the directory it replaces, or `permissions` for a new one.
pub(crate) fn replace_directory(
    dest: &Path,
    members: &[Member],
    backup: Option<&Path>,
    permissions: Option<&Permissions>,
) -> Result<()> {
    let parent = existing_parent(dest)?;

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(|e| Error::write(dest, e))?;
    directory::write_members(staging.path(), members)?;

    let permissions = match fs::metadata(dest) {
        Ok(meta) if meta.is_dir() => Some(meta.permissions()),
        _ => permissions.cloned(),
    };
    if let Some(permissions) = permissions {
        fs::set_permissions(staging.path(), permissions).map_err(|e| Error::write(dest, e))?;
    }

    let staged = staging.keep();
    let result = swap_into_place(&staged, dest, backup);
    if result.is_err() {
        let _ = fs::remove_dir_all(&staged);
    }
    result
}

fn swap_into_place(staged: &Path, dest: &Path, backup: Option<&Path>) -> Result<()> {
    if fs::symlink_metadata(dest).is_err() {
        return fs::rename(staged, dest).map_err(|e| Error::write(dest, e));
    }

    let retired = match backup {
        Some(backup) => {
            if fs::symlink_metadata(backup).is_ok() {
                remove_path(backup).map_err(|e| Error::write(backup, e))?;
            }
            backup.to_path_buf()
        },
        None => retired_path(dest),
    };

    fs::rename(dest, &retired).map_err(|e| Error::write(dest, e))?;
    if let Err(e) = fs::rename(staged, dest) {
        // Put the original back so the failed edit leaves no trace
        let _ = fs::rename(&retired, dest);
        return Err(Error::write(dest, e));
    }

    if backup.is_none()
        && let Err(e) = remove_path(&retired)
    {
        warn!("could not remove {}: {}", retired.display(), e);
    }
    Ok(())
}

fn remove_path(path: &Path) -> std::io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn retired_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!("{STAGING_PREFIX}{name}.old"))
}

/// The directory that will hold `dest`, which must already exist.
pub(crate) fn existing_parent(dest: &Path) -> Result<&Path> {
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if parent.is_dir() {
        Ok(parent)
    } else {
        Err(Error::write(
            dest,
            format!("directory {} does not exist", parent.display()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;

    #[test]
    fn test_replace_file_creates_and_backs_up() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("doc.ooutline");
        let backup = dir.path().join("doc.ooutline.bak");

        replace_file(&dest, b"first", Some(&backup), None).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"first");
        assert!(!backup.exists());

        replace_file(&dest, b"second", Some(&backup), None).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"second");
        assert_eq!(fs::read(&backup).unwrap(), b"first");
    }

    #[test]
    fn test_replace_file_missing_parent() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("no/such/dir/doc.ooutline");
        let err = replace_file(&dest, b"x", None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Write);
        assert!(!dest.exists());
    }

    #[test]
    fn test_replace_file_leaves_no_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("doc.ooutline");
        replace_file(&dest, b"content", None, None).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("doc.ooutline")]);
    }

    #[test]
    fn test_replace_directory_swaps_and_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("doc.ooutline");
        let backup = dir.path().join("doc.ooutline.bak");

        replace_directory(&dest, &[Member::file("contents.xml", b"old".to_vec())], None, None).unwrap();
        replace_directory(
            &dest,
            &[Member::file("contents.xml", b"new".to_vec())],
            Some(&backup),
            None,
        )
        .unwrap();

        assert_eq!(fs::read(dest.join("contents.xml")).unwrap(), b"new");
        assert_eq!(fs::read(backup.join("contents.xml")).unwrap(), b"old");
    }

    #[test]
    fn test_replace_directory_without_backup_removes_old_tree() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("doc.ooutline");

        replace_directory(&dest, &[Member::file("stale.xml", b"x".to_vec())], None, None).unwrap();
        replace_directory(&dest, &[Member::file("contents.xml", b"y".to_vec())], None, None).unwrap();

        assert!(!dest.join("stale.xml").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_takes_given_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("existing.ooutline");
        let fresh = dir.path().join("fresh.ooutline");

        replace_file(&existing, b"x", None, Some(&Permissions::from_mode(0o640))).unwrap();
        assert_eq!(fs::metadata(&existing).unwrap().permissions().mode() & 0o777, 0o640);

        // an existing file keeps its own mode
        replace_file(&existing, b"y", None, Some(&Permissions::from_mode(0o600))).unwrap();
        assert_eq!(fs::metadata(&existing).unwrap().permissions().mode() & 0o777, 0o640);

        replace_directory(&fresh, &[], None, Some(&Permissions::from_mode(0o755))).unwrap();
        assert_eq!(fs::metadata(&fresh).unwrap().permissions().mode() & 0o777, 0o755);
    }
}
