//! Runs an [`EditRequest`] against a document on disk.
//!
//! A run moves forward through fixed stages and stops at the first failure.
//! Only the final write stage touches the file system, so an aborted run
//! leaves both the source and the destination as they were.

use super::options::{DOCUMENT_EXTENSION, EditOptions};
use super::request::{EditRequest, MetadataMode, OutputMode};
use crate::common::{Error, ErrorKind, Result};
use crate::outline::Document;
use crate::package::existing_parent;
use crate::substitution::TokenSyntax;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Step of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preflight,
    Load,
    Metadata,
    Substitution,
    Verify,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Preflight => "preflight",
            Stage::Load => "load",
            Stage::Metadata => "metadata",
            Stage::Substitution => "substitution",
            Stage::Verify => "verify",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

/// A failed run: the stage that failed and why.
#[derive(Error, Debug)]
#[error("{stage} failed: {error}")]
pub struct RunError {
    pub stage: Stage,
    #[source]
    pub error: Error,
}

impl RunError {
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, RunError>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, RunError> {
        self.map_err(|error| RunError { stage, error })
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Where the edited document was written
    pub path: PathBuf,
    /// The previous version of an in-place edit, if one was kept
    pub backup: Option<PathBuf>,
    /// Metadata entries whose stored value changed
    pub metadata_updated: usize,
    /// Placeholder tokens replaced in the outline text
    pub replacements: usize,
}

/// Applies edit requests using one set of [`EditOptions`].
///
/// # Examples
///
/// ```no_run
/// use ooedit::editor::{DocumentWriter, EditOptions, EditRequest};
///
/// let writer = DocumentWriter::new(EditOptions::default())?;
/// let request = EditRequest::builder("plan.ooutline")
///     .metadata("Projects", "Alpha")
///     .substitute("project", "Alpha")
///     .in_place(true)
///     .build()?;
///
/// match writer.run(&request) {
///     Ok(outcome) => println!("wrote {}", outcome.path.display()),
///     Err(e) => eprintln!("{e}"),
/// }
/// # Ok::<(), ooedit::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    options: EditOptions,
    syntax: TokenSyntax,
}

impl Default for DocumentWriter {
    fn default() -> Self {
        Self {
            options: EditOptions::default(),
            syntax: TokenSyntax::default(),
        }
    }
}

impl DocumentWriter {
    /// Create a writer, validating `options`.
    pub fn new(options: EditOptions) -> Result<Self> {
        options.validate()?;
        let syntax = options.token_syntax()?;
        Ok(Self { options, syntax })
    }

    #[inline]
    pub fn options(&self) -> &EditOptions {
        &self.options
    }

    #[inline]
    pub fn syntax(&self) -> &TokenSyntax {
        &self.syntax
    }

    /// Where an in-place edit of `source` keeps its previous version: a
    /// sibling named after the source plus the backup suffix.
    pub fn backup_path(&self, source: &Path) -> PathBuf {
        match source.file_name() {
            Some(name) => {
                let mut name = name.to_owned();
                name.push(&self.options.backup_suffix);
                source.with_file_name(name)
            },
            None => {
                let mut name = source.as_os_str().to_owned();
                name.push(&self.options.backup_suffix);
                PathBuf::from(name)
            },
        }
    }

    /// Open a document for reading, applying the same source checks as a run.
    pub fn open(&self, source: &Path) -> Result<Document> {
        self.check_source(source)?;
        Document::load(source)
    }

    /// Apply `request` and write the result.
    pub fn run(&self, request: &EditRequest) -> std::result::Result<Outcome, RunError> {
        let source = request.source();
        let dest = request.destination();
        info!("editing {}", source.display());

        self.preflight(request).at(Stage::Preflight)?;

        let mut document = Document::load(source).at(Stage::Load)?;
        debug!("loaded {} members", document.package().len());

        let metadata_updated = self
            .apply_metadata(&mut document, request)
            .at(Stage::Metadata)?;
        debug!("{} metadata entries changed", metadata_updated);

        let replacements = document
            .substitute(&self.syntax, request.substitutions())
            .at(Stage::Substitution)?;
        debug!("{} placeholders replaced", replacements);

        let package = document.finish().at(Stage::Verify)?;

        let backup = match request.output() {
            OutputMode::InPlace { backup: true } => Some(self.backup_path(source)),
            _ => None,
        };
        package.save(dest, backup.as_deref()).at(Stage::Write)?;
        info!("wrote {}", dest.display());

        Ok(Outcome {
            path: dest.to_path_buf(),
            backup,
            metadata_updated,
            replacements,
        })
    }

    fn apply_metadata(&self, document: &mut Document, request: &EditRequest) -> Result<usize> {
        let store = document.metadata_mut();
        let mut changed = 0;
        for edit in request.metadata() {
            let updated = match request.metadata_mode() {
                MetadataMode::Replace => store.upsert(&edit.key, &edit.value)?,
                MetadataMode::Append => store.append(&edit.key, &edit.value)?,
            };
            debug!(key = %edit.key, updated, "metadata");
            if updated {
                changed += 1;
            }
        }
        Ok(changed)
    }

    fn preflight(&self, request: &EditRequest) -> Result<()> {
        let source = request.source();
        let meta = self.check_source(source)?;

        if request.is_in_place() && meta.permissions().readonly() {
            return Err(Error::write(source, "document is read-only"));
        }
        existing_parent(request.destination())?;
        Ok(())
    }

    fn check_source(&self, source: &Path) -> Result<fs::Metadata> {
        let meta = fs::metadata(source).map_err(|e| Error::access(source, e))?;
        if self.options.require_extension
            && source.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION)
        {
            return Err(Error::Validation(format!(
                "{} does not have the .{} extension",
                source.display(),
                DOCUMENT_EXTENSION
            )));
        }
        Ok(meta)
    }
}
