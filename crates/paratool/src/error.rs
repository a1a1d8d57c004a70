//! Error types for scanning and patching.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a scan.
///
/// Failures inside a single mod package never abort a scan; the package is
/// skipped instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The mods directory does not exist.
    #[error("mods directory not found: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The mods directory holds no packages.
    #[error("no .pak files found in the mods directory")]
    NoArchives,

    /// No package matches the target prefix.
    #[error("target package ({prefix}*.pak) not found")]
    TargetMissing { prefix: String },

    /// More than one package matches the target prefix.
    #[error("multiple target packages found; keep only one: {}", display_paths(.0))]
    MultipleTargets(Vec<PathBuf>),

    /// Package could not be read.
    #[error("package error: {0}")]
    Archive(#[from] paratool_lspk::Error),

    /// Module metadata could not be read.
    #[error("metadata error: {0}")]
    Metadata(#[from] paratool_lsx::Error),

    /// Directory listing failed.
    #[error("failed to list packages: {0}")]
    Glob(#[from] glob::GlobError),

    /// Invalid package search pattern.
    #[error("invalid package pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Errors that abort a patch run. The target package is left untouched.
#[derive(Debug, Error)]
pub enum PatchError {
    /// Every item is disabled.
    #[error("no items selected")]
    NoItemsSelected,

    /// A document the patch needs is not in the target package.
    #[error("{0} not found in the target package")]
    MissingDocument(&'static str),

    /// The run was cancelled between stages.
    #[error("patch cancelled")]
    Cancelled,

    /// Package could not be read or written.
    #[error("package error: {0}")]
    Archive(#[from] paratool_lspk::Error),

    /// Dependency metadata could not be patched.
    #[error("metadata error: {0}")]
    Metadata(#[from] paratool_lsx::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<walkdir::Error> for PatchError {
    fn from(err: walkdir::Error) -> Self {
        Self::Io(err.into())
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
