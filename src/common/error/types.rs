//! Unified error types for document editing.
//!
//! Every failure the editor can report falls into one of four kinds: the
//! source could not be accessed, the package is not a recognizable outline
//! document, the destination could not be written, or the request itself
//! was malformed.
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for ooedit operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The source path is missing, unreadable, or not a valid archive
    #[error("cannot access {}: {reason}", .path.display())]
    Access { path: PathBuf, reason: String },

    /// The package opened, but its internal structure is not an outline document
    #[error("invalid document format: {0}")]
    Format(String),

    /// The destination could not be written
    #[error("cannot write {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },

    /// The edit request is malformed
    #[error("invalid request: {0}")]
    Validation(String),
}

/// Classification of an [`Error`], used for exit codes and matching in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Access,
    Format,
    Write,
    Validation,
}

impl Error {
    /// Build an access error for `path`.
    pub fn access(path: impl AsRef<Path>, reason: impl fmt::Display) -> Self {
        Error::Access {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Build a write error for `path`.
    pub fn write(path: impl AsRef<Path>, reason: impl fmt::Display) -> Self {
        Error::Write {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Access { .. } => ErrorKind::Access,
            Error::Format(_) => ErrorKind::Format,
            Error::Write { .. } => ErrorKind::Write,
            Error::Validation(_) => ErrorKind::Validation,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Access => "access error",
            ErrorKind::Format => "format error",
            ErrorKind::Write => "write error",
            ErrorKind::Validation => "validation error",
        };
        f.write_str(name)
    }
}

/// Result type for ooedit operations.
pub type Result<T> = std::result::Result<T, Error>;
