//! Error and result aliases used throughout the crate.
//!
//! Fallible plumbing (file I/O, serialization, configuration) returns `anyhow::Error` with
//! context attached at each boundary. Errors a caller is expected to match on have their own
//! types: `action::Rejection` for invalid changes and `document::ImportError` for bad imports.

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
