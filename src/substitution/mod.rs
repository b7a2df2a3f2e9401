//! Placeholder token substitution.
//!
//! Tokens are delimiter-wrapped keys such as `{{project}}`. Scanning produces
//! spans in document order, and substitution rebuilds the text from those
//! spans without ever looking at inserted values again.

mod engine;
mod token;

pub use engine::{SubstitutionMap, Substituted, substitute, substitute_with};
pub use token::{Token, TokenSyntax, Tokens, find_tokens, is_key_char, is_valid_key};
