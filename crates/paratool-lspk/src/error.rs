//! Error types for the LSPK crate.

use thiserror::Error;

/// Errors that can occur when reading or writing LSPK packages.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] paratool_common::Error),

    /// Not an LSPK package.
    #[error("invalid LSPK magic: expected 'LSPK', got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Package revision other than the supported one.
    #[error("unsupported LSPK version {actual}, expected {expected}")]
    UnsupportedVersion { expected: u32, actual: u32 },

    /// Unknown compression method in a file record.
    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(u8),

    /// Decoded data did not have the size the package declared.
    #[error("{context}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A declared size the stored bytes cannot decode to.
    #[error("{context}: declared size {declared} is impossible for {stored} stored bytes")]
    ImplausibleSize {
        context: &'static str,
        declared: u64,
        stored: usize,
    },

    /// A region referenced by the package lies outside the file.
    #[error("region {offset}+{length} out of bounds (package size: {size})")]
    OutOfBounds { offset: u64, length: u64, size: usize },

    /// Data stored in a separate package part.
    #[error("file record references package part {0}; only single-part packages are supported")]
    MultiPart(u8),

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Path does not fit into the fixed record field.
    #[error("path too long for file record ({len} bytes, max {max}): {path}")]
    PathTooLong { path: String, len: usize, max: usize },

    /// Path is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    /// Entry path would escape the extraction directory.
    #[error("unsafe entry path: {0}")]
    UnsafePath(String),

    /// A value does not fit its on-disk field.
    #[error("{field} overflow: {value}")]
    FieldOverflow { field: &'static str, value: u64 },
}

/// Result type for LSPK operations.
pub type Result<T> = std::result::Result<T, Error>;
