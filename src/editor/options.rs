//! Editing options and their YAML form.

use crate::common::{Error, Result};
use crate::substitution::TokenSyntax;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Extension OmniOutliner gives its documents.
pub const DOCUMENT_EXTENSION: &str = "ooutline";

/// Settings that shape how documents are edited.
///
/// Options never describe a particular edit; they are the knobs a user sets
/// once, either in code or in a YAML file passed with `--config`. Missing
/// fields in the file keep their defaults.
///
/// # Examples
///
/// ```rust
/// use ooedit::editor::EditOptions;
///
/// let options = EditOptions::new()
///     .with_delimiters("@@@", "@@@")
///     .with_backup_suffix(".orig");
///
/// let from_yaml = EditOptions::from_yaml_str("token_open: \"@@@\"\ntoken_close: \"@@@\"\n")?;
/// assert_eq!(from_yaml.token_open, options.token_open);
/// # Ok::<(), ooedit::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditOptions {
    /// Delimiter that opens a placeholder token
    pub token_open: String,
    /// Delimiter that closes a placeholder token
    pub token_close: String,
    /// Appended to the document path to name the backup of an in-place edit
    pub backup_suffix: String,
    /// Refuse sources whose name does not end in `.ooutline`
    pub require_extension: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        let syntax = TokenSyntax::braces();
        Self {
            token_open: syntax.open().to_string(),
            token_close: syntax.close().to_string(),
            backup_suffix: ".bak".to_string(),
            require_extension: true,
        }
    }
}

impl EditOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder delimiters.
    #[inline]
    pub fn with_delimiters(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.token_open = open.into();
        self.token_close = close.into();
        self
    }

    #[inline]
    pub fn with_backup_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.backup_suffix = suffix.into();
        self
    }

    /// Set whether sources must carry the `.ooutline` extension.
    #[inline]
    pub fn with_require_extension(mut self, require: bool) -> Self {
        self.require_extension = require;
        self
    }

    /// Parse options from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for malformed YAML, unknown fields, or
    /// delimiters [`TokenSyntax::new`] rejects.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_saphyr::from_str(yaml)
            .map_err(|e| Error::Validation(format!("invalid options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|e| Error::access(path, e))?;
        Self::from_yaml_str(&yaml)
    }

    /// Check the options without using them.
    pub fn validate(&self) -> Result<()> {
        self.token_syntax()?;
        if self.backup_suffix.is_empty() || self.backup_suffix.contains(['/', '\\']) {
            return Err(Error::Validation(format!(
                "backup suffix {:?} must be a non-empty file name suffix",
                self.backup_suffix
            )));
        }
        Ok(())
    }

    /// The placeholder syntax these options describe.
    pub fn token_syntax(&self) -> Result<TokenSyntax> {
        TokenSyntax::new(self.token_open.as_str(), self.token_close.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;

    #[test]
    fn test_defaults() {
        let options = EditOptions::default();
        assert_eq!(options.token_syntax().unwrap(), TokenSyntax::braces());
        assert_eq!(options.backup_suffix, ".bak");
        assert!(options.require_extension);
        options.validate().unwrap();
    }

    #[test]
    fn test_yaml_fills_missing_fields() {
        let options = EditOptions::from_yaml_str("backup_suffix: .orig\n").unwrap();
        assert_eq!(options.backup_suffix, ".orig");
        assert_eq!(options.token_open, "{{");
    }

    #[test]
    fn test_yaml_triple_at() {
        let yaml = "token_open: \"@@@\"\ntoken_close: \"@@@\"\nrequire_extension: false\n";
        let options = EditOptions::from_yaml_str(yaml).unwrap();
        assert_eq!(options.token_syntax().unwrap(), TokenSyntax::triple_at());
        assert!(!options.require_extension);
    }

    #[test]
    fn test_yaml_rejects_unknown_field() {
        let err = EditOptions::from_yaml_str("colour: blue\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_rejects_bad_delimiters_and_suffix() {
        let err = EditOptions::from_yaml_str("token_open: \"<\"\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let options = EditOptions::new().with_backup_suffix("../x");
        assert_eq!(options.validate().unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_from_missing_file_is_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EditOptions::from_file(dir.path().join("none.yaml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Access);
    }
}
