//! Outline body text in `contents.xml`.
//!
//! The outline XML is never rebuilt from a tree. Text nodes are located by
//! byte span in the original member, and edits are spliced into those spans,
//! so markup, attributes, whitespace and ordering come out exactly as they
//! went in.

use crate::common::xml::{escape_cdata, escape_text};
use crate::common::{Error, Result};
use crate::substitution::{SubstitutionMap, TokenSyntax, find_tokens, substitute_with};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::ops::Range;

/// Name of the content member inside a document package.
pub const CONTENTS_MEMBER: &str = "contents.xml";

/// Root element of the outline XML.
pub const ROOT_ELEMENT: &str = "outline";

// Element holding a literal text run (rows, notes and column cells)
const LIT: &[u8] = b"lit";
const CDATA_CLOSE: usize = "]]>".len();

/// Character data inside a `lit` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    /// Byte span of the raw (still escaped) character data
    pub span: Range<usize>,
    /// Whether the span is the body of a CDATA section
    pub cdata: bool,
}

/// Content member after substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub bytes: Vec<u8>,
    pub replacements: usize,
}

/// Check that `contents` is well-formed outline XML.
///
/// # Errors
///
/// Returns [`Error::Format`] if the member is not UTF-8, not well-formed, or
/// its root element is not `outline`.
pub fn validate(contents: &[u8]) -> Result<()> {
    let text = std::str::from_utf8(contents)?;
    text_nodes(text).map(|_| ())
}

/// Locate every text node of the outline, in document order.
///
/// Adjacent text and entity references form a single node, so a node's span
/// covers a whole run of character data between two pieces of markup.
pub fn text_nodes(contents: &str) -> Result<Vec<TextNode>> {
    let mut reader = Reader::from_str(contents);
    let mut nodes = Vec::new();
    let mut pending: Option<Range<usize>> = None;
    let mut depth = 0usize;
    let mut lit_depth = 0usize;
    let mut root_seen = false;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| {
            Error::Format(format!(
                "{} is not well-formed at byte {}: {}",
                CONTENTS_MEMBER,
                reader.buffer_position(),
                e
            ))
        })?;

        let chars = match &event {
            Event::Text(t) if lit_depth > 0 => Some(start..start + t.len()),
            Event::GeneralRef(r) if lit_depth > 0 => Some(start..start + r.len() + 2),
            _ => None,
        };
        if let Some(span) = chars {
            match pending.as_mut() {
                Some(run) if run.end == span.start => run.end = span.end,
                _ => {
                    if let Some(run) = pending.replace(span) {
                        nodes.push(TextNode { span: run, cdata: false });
                    }
                },
            }
            continue;
        }
        if let Some(run) = pending.take() {
            nodes.push(TextNode { span: run, cdata: false });
        }

        match event {
            Event::Start(e) => {
                check_root(&mut root_seen, e.local_name().as_ref())?;
                depth += 1;
                if e.local_name().as_ref() == LIT {
                    lit_depth += 1;
                }
            },
            Event::Empty(e) => check_root(&mut root_seen, e.local_name().as_ref())?,
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if e.local_name().as_ref() == LIT {
                    lit_depth = lit_depth.saturating_sub(1);
                }
            },
            Event::CData(data) if lit_depth > 0 => {
                let end = reader.buffer_position() as usize - CDATA_CLOSE;
                nodes.push(TextNode {
                    span: end - data.len()..end,
                    cdata: true,
                });
            },
            Event::Eof => break,
            _ => {},
        }
    }

    if !root_seen {
        return Err(Error::Format(format!("{} has no root element", CONTENTS_MEMBER)));
    }
    if depth > 0 {
        return Err(Error::Format(format!(
            "{} ends with {} unclosed element(s)",
            CONTENTS_MEMBER, depth
        )));
    }
    Ok(nodes)
}

fn check_root(root_seen: &mut bool, name: &[u8]) -> Result<()> {
    if *root_seen {
        return Ok(());
    }
    if name != ROOT_ELEMENT.as_bytes() {
        return Err(Error::Format(format!(
            "{} root element is <{}>, expected <{}>",
            CONTENTS_MEMBER,
            String::from_utf8_lossy(name),
            ROOT_ELEMENT
        )));
    }
    *root_seen = true;
    Ok(())
}

/// Substitute placeholder tokens in every text node of `contents`.
///
/// Values are escaped for the node they land in. Returns `None` when no token
/// was replaced, in which case the member should be left as it is.
pub fn substitute_text_nodes(
    contents: &[u8],
    syntax: &TokenSyntax,
    map: &SubstitutionMap,
) -> Result<Option<Rewritten>> {
    let text = std::str::from_utf8(contents)?;
    let nodes = text_nodes(text)?;

    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut replacements = 0;

    for node in &nodes {
        let raw = &text[node.span.clone()];
        let result = substitute_with(raw, syntax, |key| {
            map.get(key).map(|value| {
                if node.cdata {
                    escape_cdata(value)
                } else {
                    escape_text(value)
                }
            })
        });
        if let Cow::Owned(new) = result.text {
            out.push_str(&text[copied..node.span.start]);
            out.push_str(&new);
            copied = node.span.end;
            replacements += result.replacements;
        }
    }

    if replacements == 0 {
        return Ok(None);
    }
    out.push_str(&text[copied..]);
    Ok(Some(Rewritten {
        bytes: out.into_bytes(),
        replacements,
    }))
}

/// Distinct placeholder keys in the outline text, in order of first appearance.
pub fn placeholders(contents: &[u8], syntax: &TokenSyntax) -> Result<Vec<String>> {
    let text = std::str::from_utf8(contents)?;
    let mut keys: Vec<String> = Vec::new();
    for node in text_nodes(text)? {
        for token in find_tokens(&text[node.span], syntax) {
            if !keys.iter().any(|k| k == token.key) {
                keys.push(token.key.to_string());
            }
        }
    }
    Ok(keys)
}
