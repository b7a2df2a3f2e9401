//! Error conversion implementations.
//!
//! Parser errors raised while reading document members all mean the package
//! holds something other than a well-formed outline document, so they map to
//! [`Error::Format`].

use super::types::Error;

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Format(format!("XML error: {}", err))
    }
}

impl From<plist::Error> for Error {
    fn from(err: plist::Error) -> Self {
        Error::Format(format!("property list error: {}", err))
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::Format(format!("text is not valid UTF-8: {}", err))
    }
}
