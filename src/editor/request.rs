//! The typed description of one edit.

use crate::common::xml::find_invalid_char;
use crate::common::{Error, Result};
use crate::outline::fields;
use crate::substitution::{SubstitutionMap, is_valid_key};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the edited document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Replace the source, optionally keeping the previous version beside it
    InPlace { backup: bool },
    /// Write to a different path and leave the source alone
    NewPath(PathBuf),
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::InPlace { backup: false }
    }
}

/// How metadata values combine with what is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataMode {
    /// Each value replaces the stored one
    #[default]
    Replace,
    /// List fields gain the value; text fields are replaced
    Append,
}

/// One metadata assignment, with its key already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEdit {
    pub key: String,
    pub value: String,
}

/// A validated edit request. Built with [`EditRequest::builder`].
///
/// # Examples
///
/// ```
/// use ooedit::editor::EditRequest;
///
/// let request = EditRequest::builder("plan.ooutline")
///     .metadata("Comments", "reviewed")
///     .substitute("project", "Alpha")
///     .save_as("plan-alpha.ooutline")
///     .build()?;
///
/// assert_eq!(request.metadata()[0].key, "kMDItemComment");
/// # Ok::<(), ooedit::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct EditRequest {
    source: PathBuf,
    output: OutputMode,
    metadata: Vec<MetadataEdit>,
    mode: MetadataMode,
    substitutions: SubstitutionMap,
}

impl EditRequest {
    pub fn builder(source: impl Into<PathBuf>) -> EditRequestBuilder {
        EditRequestBuilder::new(source)
    }

    #[inline]
    pub fn source(&self) -> &Path {
        &self.source
    }

    #[inline]
    pub fn output(&self) -> &OutputMode {
        &self.output
    }

    /// The path the edited document is written to.
    pub fn destination(&self) -> &Path {
        match &self.output {
            OutputMode::InPlace { .. } => &self.source,
            OutputMode::NewPath(path) => path,
        }
    }

    #[inline]
    pub fn is_in_place(&self) -> bool {
        matches!(self.output, OutputMode::InPlace { .. })
    }

    #[inline]
    pub fn metadata(&self) -> &[MetadataEdit] {
        &self.metadata
    }

    #[inline]
    pub fn metadata_mode(&self) -> MetadataMode {
        self.mode
    }

    #[inline]
    pub fn substitutions(&self) -> &SubstitutionMap {
        &self.substitutions
    }
}

/// Collects the parts of an [`EditRequest`] and validates them together.
#[derive(Debug, Clone)]
pub struct EditRequestBuilder {
    source: PathBuf,
    in_place: Option<bool>,
    save_as: Option<PathBuf>,
    metadata: Vec<(String, String)>,
    substitutions: Vec<(String, String)>,
    mode: MetadataMode,
    raw_keys: bool,
}

impl EditRequestBuilder {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            in_place: None,
            save_as: None,
            metadata: Vec::new(),
            substitutions: Vec::new(),
            mode: MetadataMode::default(),
            raw_keys: false,
        }
    }

    /// Edit the source in place. This is the default when no output is chosen.
    ///
    /// Combining this with [`save_as`](Self::save_as) is rejected by
    /// [`build`](Self::build).
    pub fn in_place(mut self, backup: bool) -> Self {
        self.in_place = Some(backup);
        self
    }

    /// Write the result to `path` instead of the source.
    pub fn save_as(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_as = Some(path.into());
        self
    }

    /// Set metadata field `key`, given by inspector label or attribute name.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Replace the placeholder `key` with `value` in the outline text.
    pub fn substitute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.substitutions.push((key.into(), value.into()));
        self
    }

    pub fn metadata_mode(mut self, mode: MetadataMode) -> Self {
        self.mode = mode;
        self
    }

    /// Use metadata keys exactly as given instead of resolving field labels.
    pub fn raw_keys(mut self, raw: bool) -> Self {
        self.raw_keys = raw;
        self
    }

    /// Validate and freeze the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if there is nothing to do, a key is empty
    /// or malformed, a value holds characters XML cannot represent, both an
    /// in-place edit and a new path were requested, or the output path is the
    /// source itself. Paths that both exist are compared after resolving links
    /// and `.`/`..` components; otherwise they are compared as written.
    pub fn build(self) -> Result<EditRequest> {
        if self.source.as_os_str().is_empty() {
            return Err(Error::Validation("document path is empty".into()));
        }
        if self.metadata.is_empty() && self.substitutions.is_empty() {
            return Err(Error::Validation(
                "nothing to do: give at least one metadata field or substitution".into(),
            ));
        }
        let output = match (self.save_as, self.in_place) {
            (Some(path), Some(_)) => {
                return Err(Error::Validation(format!(
                    "cannot both edit in place and save as {}",
                    path.display()
                )));
            },
            (Some(path), None) => {
                if path.as_os_str().is_empty() {
                    return Err(Error::Validation("output path is empty".into()));
                }
                if same_file(&path, &self.source) {
                    return Err(Error::Validation(format!(
                        "output path {} is the document itself; edit in place instead",
                        path.display()
                    )));
                }
                OutputMode::NewPath(path)
            },
            (None, backup) => OutputMode::InPlace {
                backup: backup.unwrap_or(false),
            },
        };

        let mut metadata = Vec::with_capacity(self.metadata.len());
        for (key, value) in self.metadata {
            let key = key.trim();
            if key.is_empty() {
                return Err(Error::Validation("metadata key is empty".into()));
            }
            check_xml_text("metadata key", key)?;
            check_xml_text("metadata value", &value)?;
            let key = if self.raw_keys {
                key
            } else {
                fields::canonical_key(key)
            };
            metadata.push(MetadataEdit {
                key: key.to_string(),
                value,
            });
        }

        let mut substitutions = SubstitutionMap::new();
        for (key, value) in self.substitutions {
            if !is_valid_key(&key) {
                return Err(Error::Validation(format!(
                    "placeholder key {:?} may only contain letters, digits, '_', '-' and '.'",
                    key
                )));
            }
            check_xml_text("replacement value", &value)?;
            substitutions.insert(key, value);
        }

        Ok(EditRequest {
            source: self.source,
            output,
            metadata,
            mode: self.mode,
            substitutions,
        })
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn check_xml_text(what: &str, text: &str) -> Result<()> {
    match find_invalid_char(text) {
        Some(c) => Err(Error::Validation(format!(
            "{} {:?} contains character U+{:04X}, which XML cannot represent",
            what, text, c as u32
        ))),
        None => Ok(()),
    }
}

/// Split a `KEY=VALUE` argument at its first `=`.
///
/// The key is trimmed; the value is kept as written and may be empty.
///
/// # Examples
///
/// ```
/// use ooedit::editor::parse_assignment;
///
/// assert_eq!(parse_assignment("Comments=a=b")?, ("Comments".to_string(), "a=b".to_string()));
/// assert!(parse_assignment("Comments").is_err());
/// # Ok::<(), ooedit::Error>(())
/// ```
pub fn parse_assignment(arg: &str) -> Result<(String, String)> {
    let Some((key, value)) = arg.split_once('=') else {
        return Err(Error::Validation(format!("expected KEY=VALUE, got {:?}", arg)));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::Validation(format!("missing key in {:?}", arg)));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;

    #[test]
    fn test_resolves_field_labels() {
        let request = EditRequest::builder("a.ooutline")
            .metadata("project", "Alpha")
            .metadata("kMDItemComment", "c")
            .metadata("custom", "x")
            .build()
            .unwrap();
        let keys: Vec<&str> = request.metadata().iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, ["kMDItemProjects", "kMDItemComment", "custom"]);
    }

    #[test]
    fn test_raw_keys_are_kept() {
        let request = EditRequest::builder("a.ooutline")
            .metadata("project", "Alpha")
            .raw_keys(true)
            .build()
            .unwrap();
        assert_eq!(request.metadata()[0].key, "project");
    }

    #[test]
    fn test_empty_request_is_rejected() {
        let err = EditRequest::builder("a.ooutline").build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_bad_keys_and_values() {
        let cases = [
            EditRequest::builder("a.ooutline").metadata("  ", "x"),
            EditRequest::builder("a.ooutline").metadata("k", "bell\u{7}"),
            EditRequest::builder("a.ooutline").substitute("has space", "x"),
            EditRequest::builder("a.ooutline").substitute("", "x"),
            EditRequest::builder("a.ooutline").substitute("k", "\u{0}"),
        ];
        for builder in cases {
            assert_eq!(builder.build().unwrap_err().kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn test_output_modes() {
        let request = EditRequest::builder("a.ooutline")
            .substitute("k", "v")
            .in_place(true)
            .build()
            .unwrap();
        assert!(request.is_in_place());
        assert_eq!(request.destination(), Path::new("a.ooutline"));

        let request = EditRequest::builder("a.ooutline")
            .substitute("k", "v")
            .save_as("b.ooutline")
            .build()
            .unwrap();
        assert_eq!(request.destination(), Path::new("b.ooutline"));

        let err = EditRequest::builder("a.ooutline")
            .substitute("k", "v")
            .save_as("a.ooutline")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_conflicting_output_modes() {
        for builder in [
            EditRequest::builder("a.ooutline").save_as("b.ooutline").in_place(true),
            EditRequest::builder("a.ooutline").in_place(false).save_as("b.ooutline"),
        ] {
            let err = builder.substitute("k", "v").build().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert!(err.to_string().contains("b.ooutline"));
        }
    }

    #[test]
    fn test_save_as_source_through_other_spelling() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.ooutline");
        fs::write(&source, b"doc").unwrap();

        let err = EditRequest::builder(&source)
            .substitute("k", "v")
            .save_as(dir.path().join(".").join("a.ooutline"))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let request = EditRequest::builder(&source)
            .substitute("k", "v")
            .save_as(dir.path().join("b.ooutline"))
            .build()
            .unwrap();
        assert!(!request.is_in_place());
    }

    #[test]
    fn test_empty_value_is_allowed() {
        let request = EditRequest::builder("a.ooutline")
            .metadata("Comments", "")
            .substitute("k", "")
            .build()
            .unwrap();
        assert_eq!(request.metadata()[0].value, "");
        assert_eq!(request.substitutions().get("k"), Some(""));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment(" key =value ").unwrap(),
            ("key".to_string(), "value ".to_string())
        );
        assert_eq!(parse_assignment("k=").unwrap().1, "");
        assert_eq!(parse_assignment("=v").unwrap_err().kind(), ErrorKind::Validation);
    }
}
