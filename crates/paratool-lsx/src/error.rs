//! Error types for LSX handling.

use thiserror::Error;

/// Errors that can occur when reading or writing LSX documents.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// Document is not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Document has no root element.
    #[error("no root element found")]
    NoRoot,
}

/// Result type for LSX operations.
pub type Result<T> = std::result::Result<T, Error>;
