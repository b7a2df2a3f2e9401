//! The metadata fields shown in OmniOutliner's document inspector.
//!
//! The inspector labels each field with a human-readable title, while
//! `metadata.xml` stores it under a Spotlight attribute name. Either form is
//! accepted on input, case-insensitively, and a few common singular/plural
//! slips are tolerated.

use phf::phf_map;

/// Shape of a field's value in the property list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A single string
    Text,
    /// An array of strings
    List,
}

/// A known metadata field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Title used by the document inspector
    pub label: &'static str,
    /// Attribute name stored in `metadata.xml`
    pub key: &'static str,
    pub kind: FieldKind,
}

/// All inspector fields, in inspector order.
pub static FIELDS: [Field; 10] = [
    Field { label: "Authors", key: "kMDItemAuthors", kind: FieldKind::List },
    Field { label: "Comments", key: "kMDItemComment", kind: FieldKind::Text },
    Field { label: "Copyright", key: "kMDItemCopyright", kind: FieldKind::Text },
    Field { label: "Description", key: "kMDItemDescription", kind: FieldKind::Text },
    Field { label: "Keywords", key: "kMDItemKeywords", kind: FieldKind::List },
    Field { label: "Languages", key: "kMDItemLanguages", kind: FieldKind::List },
    Field { label: "Organizations", key: "kMDItemOrganizations", kind: FieldKind::List },
    Field { label: "Projects", key: "kMDItemProjects", kind: FieldKind::List },
    Field { label: "Subject", key: "kMDItemSubject", kind: FieldKind::Text },
    Field { label: "Version", key: "kMDItemVersion", kind: FieldKind::Text },
];

// Lowercased label or attribute name -> index into FIELDS
static BY_NAME: phf::Map<&'static str, usize> = phf_map! {
    "authors" => 0,
    "author" => 0,
    "kmditemauthors" => 0,
    "comments" => 1,
    "comment" => 1,
    "kmditemcomment" => 1,
    "copyright" => 2,
    "kmditemcopyright" => 2,
    "description" => 3,
    "kmditemdescription" => 3,
    "keywords" => 4,
    "keyword" => 4,
    "kmditemkeywords" => 4,
    "languages" => 5,
    "language" => 5,
    "kmditemlanguages" => 5,
    "organizations" => 6,
    "organization" => 6,
    "kmditemorganizations" => 6,
    "projects" => 7,
    "project" => 7,
    "kmditemprojects" => 7,
    "subject" => 8,
    "kmditemsubject" => 8,
    "version" => 9,
    "kmditemversion" => 9,
};

/// Find a field by inspector label or attribute name, ignoring case.
pub fn lookup(name: &str) -> Option<&'static Field> {
    BY_NAME
        .get(name.to_ascii_lowercase().as_str())
        .map(|&i| &FIELDS[i])
}

/// Find a field by its exact attribute name.
pub fn by_key(key: &str) -> Option<&'static Field> {
    FIELDS.iter().find(|f| f.key == key)
}

/// Resolve a user-supplied name to the key stored in `metadata.xml`.
///
/// Known labels and attribute names map to their attribute name; anything
/// else is returned unchanged and treated as an opaque key.
///
/// # Examples
///
/// ```
/// use ooedit::outline::fields::canonical_key;
/// assert_eq!(canonical_key("comments"), "kMDItemComment");
/// assert_eq!(canonical_key("KMDITEMAUTHORS"), "kMDItemAuthors");
/// assert_eq!(canonical_key("x-custom"), "x-custom");
/// ```
pub fn canonical_key(name: &str) -> &str {
    lookup(name).map_or(name, |field| field.key)
}
