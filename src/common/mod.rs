//! Types and helpers shared by the package, outline and editor layers.

pub mod error;
pub mod xml;

pub use error::{Error, ErrorKind, Result};
