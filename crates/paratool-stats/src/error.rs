//! Error types for the stats crate.

use thiserror::Error;

/// Errors that can occur when loading stat catalogs.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid glob pattern built from a directory path.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Directory listing failed part-way.
    #[error("failed to list stat files: {0}")]
    Glob(#[from] glob::GlobError),

    /// Unrecognised pool name.
    #[error("unknown pool: {0}")]
    UnknownPool(String),

    /// Unrecognised rarity name.
    #[error("unknown rarity: {0}")]
    UnknownRarity(String),
}

/// Result type for stats operations.
pub type Result<T> = std::result::Result<T, Error>;
