//! XML text helpers shared by the outline content and metadata layers.

mod escape;

pub use escape::{escape_cdata, escape_text, find_invalid_char, is_xml_char};
