//! Document metadata stored in `metadata.xml`.
//!
//! OmniOutliner keeps the document inspector's fields in an XML property list
//! whose root is a dictionary keyed by Spotlight attribute names. The store
//! edits that dictionary in place, so entries it never touches keep their
//! position and their original values, including types it does not model.

use super::fields::{self, FieldKind};
use crate::common::xml::find_invalid_char;
use crate::common::{Error, Result};
use plist::{Dictionary, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::io::Cursor;

/// Name of the metadata member inside a document package.
pub const METADATA_MEMBER: &str = "metadata.xml";

/// A metadata value as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// A single string
    Text(String),
    /// An array of strings
    List(Vec<String>),
    /// Any other property list value, rendered for display only
    Other(String),
}

impl MetadataValue {
    fn from_plist(value: &Value) -> Self {
        match value {
            Value::String(s) => MetadataValue::Text(s.clone()),
            Value::Array(items) => {
                let strings: Option<Vec<String>> =
                    items.iter().map(|v| v.as_string().map(str::to_string)).collect();
                match strings {
                    Some(list) => MetadataValue::List(list),
                    None => MetadataValue::Other(format!("{:?}", items)),
                }
            },
            Value::Integer(i) => MetadataValue::Other(i.to_string()),
            Value::Real(r) => MetadataValue::Other(r.to_string()),
            Value::Boolean(b) => MetadataValue::Other(b.to_string()),
            Value::Date(d) => MetadataValue::Other(format!("{:?}", d)),
            other => MetadataValue::Other(format!("{:?}", other)),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(s) | MetadataValue::Other(s) => f.write_str(s),
            MetadataValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// Key/value view over a document's metadata dictionary.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    entries: Dictionary,
    dirty: bool,
}

impl MetadataStore {
    /// Create an empty store, for documents that have no metadata member yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the content of a metadata member.
    ///
    /// Both XML and binary property lists are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if `bytes` is not a property list or its root
    /// is not a dictionary.
    pub fn from_plist(bytes: &[u8]) -> Result<Self> {
        match Value::from_reader(Cursor::new(bytes))? {
            Value::Dictionary(entries) => Ok(Self {
                entries,
                dirty: false,
            }),
            other => Err(Error::Format(format!(
                "{} root must be a dictionary, found {}",
                METADATA_MEMBER,
                plist_type_name(&other)
            ))),
        }
    }

    /// Render the dictionary as an XML property list.
    pub fn to_plist(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        Value::Dictionary(self.entries.clone()).to_writer_xml(&mut buf)?;
        Ok(buf)
    }

    pub fn get(&self, key: &str) -> Option<MetadataValue> {
        self.entries.get(key).map(MetadataValue::from_plist)
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in dictionary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in dictionary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, MetadataValue)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), MetadataValue::from_plist(v)))
    }

    /// Whether any entry changed since the store was parsed.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Set `key` to `value`, creating or replacing the entry.
    ///
    /// List-typed fields, and unknown keys that already hold an array, store a
    /// one-element list; everything else stores a string. An empty `value` is
    /// stored as an empty string, not treated as removal.
    ///
    /// Returns `true` if the stored value changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `key` is empty or either string holds
    /// characters XML cannot represent. The store is left unchanged.
    pub fn upsert(&mut self, key: &str, value: &str) -> Result<bool> {
        check_entry(key, value)?;
        let new = match self.kind_for(key) {
            FieldKind::List => Value::Array(vec![Value::String(value.to_string())]),
            FieldKind::Text => Value::String(value.to_string()),
        };
        if self.entries.get(key) == Some(&new) {
            return Ok(false);
        }
        self.entries.insert(key.to_string(), new);
        self.dirty = true;
        Ok(true)
    }

    /// Add `value` to a list-typed entry unless it is already present.
    ///
    /// Text-typed keys behave exactly like [`upsert`](Self::upsert).
    ///
    /// Returns `true` if the stored value changed. Fails like
    /// [`upsert`](Self::upsert).
    pub fn append(&mut self, key: &str, value: &str) -> Result<bool> {
        if self.kind_for(key) == FieldKind::Text {
            return self.upsert(key, value);
        }
        check_entry(key, value)?;

        let item = Value::String(value.to_string());
        let changed = match self.entries.get_mut(key) {
            Some(Value::Array(items)) => {
                if items.contains(&item) {
                    false
                } else {
                    items.push(item);
                    true
                }
            },
            Some(existing) => {
                if *existing == item {
                    false
                } else {
                    let previous = std::mem::replace(existing, Value::Boolean(false));
                    *existing = Value::Array(vec![previous, item]);
                    true
                }
            },
            None => {
                self.entries.insert(key.to_string(), Value::Array(vec![item]));
                true
            },
        };
        self.dirty |= changed;
        Ok(changed)
    }

    fn kind_for(&self, key: &str) -> FieldKind {
        if let Some(field) = fields::by_key(key) {
            return field.kind;
        }
        match self.entries.get(key) {
            Some(Value::Array(_)) => FieldKind::List,
            _ => FieldKind::Text,
        }
    }
}

impl Serialize for MetadataStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, &value)?;
        }
        map.end()
    }
}

fn check_entry(key: &str, value: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::Validation("metadata key is empty".into()));
    }
    for text in [key, value] {
        if let Some(c) = find_invalid_char(text) {
            return Err(Error::Validation(format!(
                "metadata entry {:?} contains character U+{:04X}, which XML cannot represent",
                key, c as u32
            )));
        }
    }
    Ok(())
}

fn plist_type_name(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "an array",
        Value::Dictionary(_) => "a dictionary",
        Value::Boolean(_) => "a boolean",
        Value::Data(_) => "data",
        Value::Date(_) => "a date",
        Value::Real(_) => "a real number",
        Value::Integer(_) => "an integer",
        Value::String(_) => "a string",
        _ => "an unsupported value",
    }
}
