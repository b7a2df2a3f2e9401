//! Token substitution as a pure text transform.

use super::token::{TokenSyntax, find_tokens};
use std::borrow::Cow;
use std::collections::HashMap;

/// Placeholder keys mapped to their replacement values.
///
/// Inserting a key twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionMap {
    values: HashMap<String, String>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value for `key`, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SubstitutionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Result of substituting one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substituted<'t> {
    pub text: Cow<'t, str>,
    /// Number of tokens replaced
    pub replacements: usize,
}

/// Replace every token whose key is in `map` with its value.
///
/// Values are inserted literally and never scanned again, so a value that
/// itself looks like a token stays as it is. Tokens for unknown keys are kept
/// verbatim, delimiters included. Returns borrowed text when nothing matched.
///
/// # Examples
///
/// ```
/// use ooedit::substitution::{substitute, SubstitutionMap, TokenSyntax};
///
/// let map: SubstitutionMap = [("project", "Alpha")].into_iter().collect();
/// let out = substitute("{{project}} / {{owner}}", &TokenSyntax::braces(), &map);
/// assert_eq!(out, "Alpha / {{owner}}");
/// ```
pub fn substitute<'t>(text: &'t str, syntax: &TokenSyntax, map: &SubstitutionMap) -> Cow<'t, str> {
    substitute_with(text, syntax, |key| map.get(key).map(Cow::Borrowed)).text
}

/// Replace tokens using `lookup` to produce each replacement.
///
/// `lookup` returns `None` to leave a token untouched. This is the building
/// block for callers that must encode values for their context, such as XML
/// escaping.
pub fn substitute_with<'t, 'v, F>(text: &'t str, syntax: &TokenSyntax, mut lookup: F) -> Substituted<'t>
where
    F: FnMut(&str) -> Option<Cow<'v, str>>,
{
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut replacements = 0;

    for token in find_tokens(text, syntax) {
        let Some(value) = lookup(token.key) else {
            continue;
        };
        let buf = out.get_or_insert_with(|| String::with_capacity(text.len()));
        buf.push_str(&text[copied..token.span.start]);
        buf.push_str(&value);
        copied = token.span.end;
        replacements += 1;
    }

    let text = match out {
        Some(mut buf) => {
            buf.push_str(&text[copied..]);
            Cow::Owned(buf)
        },
        None => Cow::Borrowed(text),
    };
    Substituted { text, replacements }
}
