use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use std::borrow::Cow;

// Static initialization: automaton is built only once, thread-safe
static TEXT_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">"])
        .expect("Failed to build XML text escaper")
});

const CDATA_END: &str = "]]>";

/// Escape a value for insertion into XML character data.
///
/// Only the characters that are significant in element content are replaced;
/// quotes are left alone since the result never lands in an attribute.
///
/// # Examples
///
/// ```
/// use ooedit::common::xml::escape_text;
/// assert_eq!(escape_text("a & b"), "a &amp; b");
/// assert_eq!(escape_text("<b>\"x\"</b>"), "&lt;b&gt;\"x\"&lt;/b&gt;");
/// ```
#[inline]
pub fn escape_text(s: &str) -> Cow<'_, str> {
    if !TEXT_ESCAPER.is_match(s) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(TEXT_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;"]))
}

/// Prepare a value for insertion inside a CDATA section.
///
/// A literal `]]>` would end the section early, so it is split across two
/// adjacent sections.
///
/// # Examples
///
/// ```
/// use ooedit::common::xml::escape_cdata;
/// assert_eq!(escape_cdata("plain"), "plain");
/// assert_eq!(escape_cdata("a]]>b"), "a]]]]><![CDATA[>b");
/// ```
#[inline]
pub fn escape_cdata(s: &str) -> Cow<'_, str> {
    if s.contains(CDATA_END) {
        Cow::Owned(s.replace(CDATA_END, "]]]]><![CDATA[>"))
    } else {
        Cow::Borrowed(s)
    }
}

/// Whether `c` may appear in an XML 1.0 document.
#[inline]
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Return the first character of `s` that XML 1.0 cannot represent.
///
/// # Examples
///
/// ```
/// use ooedit::common::xml::find_invalid_char;
/// assert_eq!(find_invalid_char("line\nbreak"), None);
/// assert_eq!(find_invalid_char("bell\u{7}"), Some('\u{7}'));
/// ```
pub fn find_invalid_char(s: &str) -> Option<char> {
    s.chars().find(|&c| !is_xml_char(c))
}
