//! Placeholder token syntax and scanning.

use crate::common::{Error, Result};
use memchr::memmem::Finder;
use std::fmt;
use std::ops::Range;

/// Opening and closing delimiters that wrap a placeholder key.
///
/// A token is `open`, one or more key characters, then `close`. Key characters
/// are ASCII letters and digits plus `_`, `-` and `.`; matching is
/// case-sensitive.
#[derive(Clone)]
pub struct TokenSyntax {
    open: String,
    close: String,
    finder: Finder<'static>,
}

impl TokenSyntax {
    /// Create a syntax from custom delimiters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a delimiter is empty, contains XML
    /// markup characters or whitespace, or if `close` begins with a character
    /// that could be part of a key (which would make the key's end ambiguous).
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Result<Self> {
        let open = open.into();
        let close = close.into();

        for (label, delim) in [("opening", &open), ("closing", &close)] {
            if delim.is_empty() {
                return Err(Error::Validation(format!("{label} token delimiter is empty")));
            }
            if let Some(c) = delim
                .chars()
                .find(|c| matches!(c, '<' | '>' | '&') || c.is_whitespace() || c.is_control())
            {
                return Err(Error::Validation(format!(
                    "{label} token delimiter {delim:?} contains unsupported character {c:?}"
                )));
            }
        }
        if close.chars().next().is_some_and(is_key_char) {
            return Err(Error::Validation(format!(
                "closing token delimiter {close:?} must not start with a key character"
            )));
        }

        let finder = Finder::new(open.as_bytes()).into_owned();
        Ok(Self {
            open,
            close,
            finder,
        })
    }

    /// `{{key}}`, the default syntax.
    pub fn braces() -> Self {
        Self::from_static("{{", "}}")
    }

    /// `@@@key@@@`, the syntax used by earlier OmniOutliner templating tools.
    pub fn triple_at() -> Self {
        Self::from_static("@@@", "@@@")
    }

    fn from_static(open: &'static str, close: &'static str) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
            finder: Finder::new(open.as_bytes()).into_owned(),
        }
    }

    #[inline]
    pub fn open(&self) -> &str {
        &self.open
    }

    #[inline]
    pub fn close(&self) -> &str {
        &self.close
    }

    /// Render `key` as a token in this syntax.
    pub fn token_for(&self, key: &str) -> String {
        format!("{}{}{}", self.open, key, self.close)
    }
}

impl Default for TokenSyntax {
    fn default() -> Self {
        Self::braces()
    }
}

impl PartialEq for TokenSyntax {
    fn eq(&self, other: &Self) -> bool {
        self.open == other.open && self.close == other.close
    }
}

impl Eq for TokenSyntax {}

impl fmt::Debug for TokenSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSyntax")
            .field("open", &self.open)
            .field("close", &self.close)
            .finish()
    }
}

/// Whether `c` may appear in a placeholder key.
#[inline]
pub fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Whether `key` is a well-formed placeholder key.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(is_key_char)
}

/// A placeholder token found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'t> {
    /// Byte range of the whole token, delimiters included
    pub span: Range<usize>,
    /// The key between the delimiters
    pub key: &'t str,
}

/// Iterator over the tokens of a text, in order of appearance.
///
/// Created by [`find_tokens`]. Cloning the iterator restarts nothing; it
/// continues independently from the same position.
#[derive(Clone)]
pub struct Tokens<'t> {
    text: &'t str,
    syntax: &'t TokenSyntax,
    pos: usize,
}

/// Scan `text` left-to-right for placeholder tokens.
///
/// Matches never overlap: after a token, scanning resumes immediately after
/// its closing delimiter. An opening delimiter that does not start a valid
/// token is skipped one character at a time.
///
/// # Examples
///
/// ```
/// use ooedit::substitution::{find_tokens, TokenSyntax};
///
/// let syntax = TokenSyntax::braces();
/// let keys: Vec<&str> = find_tokens("{{a}} and {{b c}} and {{{d}}", &syntax)
///     .map(|t| t.key)
///     .collect();
/// assert_eq!(keys, ["a", "d"]);
/// ```
pub fn find_tokens<'t>(text: &'t str, syntax: &'t TokenSyntax) -> Tokens<'t> {
    Tokens {
        text,
        syntax,
        pos: 0,
    }
}

impl<'t> Iterator for Tokens<'t> {
    type Item = Token<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let open_len = self.syntax.open.len();

        while self.pos < self.text.len() {
            let rest = &self.text.as_bytes()[self.pos..];
            let start = self.pos + self.syntax.finder.find(rest)?;
            let key_start = start + open_len;

            let after_open = &self.text[key_start..];
            let key_len = after_open
                .find(|c: char| !is_key_char(c))
                .unwrap_or(after_open.len());
            let key_end = key_start + key_len;

            if key_len > 0 && self.text[key_end..].starts_with(self.syntax.close.as_str()) {
                let end = key_end + self.syntax.close.len();
                self.pos = end;
                return Some(Token {
                    span: start..end,
                    key: &self.text[key_start..key_end],
                });
            }

            // Not a token here; retry from the next character
            let step = self.text[start..].chars().next().map_or(1, char::len_utf8);
            self.pos = start + step;
        }

        None
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}
