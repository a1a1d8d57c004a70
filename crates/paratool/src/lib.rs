//! ParaTool - merge item mods into an aggregator loot package.
//!
//! This crate ties the ParaTool library ecosystem together:
//!
//! - [`scan`] finds the aggregator package and classifies the items of every
//!   other mod package in a directory
//! - [`pipeline`] extracts the aggregator, patches its treasure tables, stat
//!   overrides and dependency metadata, and repacks it in place
//!
//! # Crates
//!
//! - [`paratool_common`] - Binary reading, checksums, quoted text fields
//! - [`paratool_lspk`] - LSPK package reading and writing
//! - [`paratool_stats`] - Stat entries, inheritance, classification, pricing
//! - [`paratool_treasure`] - Treasure table parsing and patching
//! - [`paratool_lsx`] - LSX metadata documents
//!
//! # Example
//!
//! ```no_run
//! use paratool::prelude::*;
//!
//! let base = BaseStats::load_dir("BaseStats")?;
//! let result = ModScanner::new(&base).scan("Mods", |_| {})?;
//!
//! let summary = Patcher::default().patch(
//!     &result.target_archive,
//!     &result.mods,
//!     &NoProgress,
//!     &CancellationToken::new(),
//! )?;
//! println!("patched {} items", summary.items_patched);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod progress;
mod workspace;

pub mod pipeline;
pub mod scan;

// Re-export all sub-crates
pub use paratool_common as common;
pub use paratool_lspk as lspk;
pub use paratool_lsx as lsx;
pub use paratool_stats as stats;
pub use paratool_treasure as treasure;

pub use error::{PatchError, ScanError};
pub use pipeline::{patch, PatchOptions, PatchSummary, Patcher};
pub use progress::{CancellationToken, NoProgress, PatchProgress, ProgressSink, ScanProgress, Stage};
pub use scan::{ModScanner, ScanOptions, ScanResult};
pub use workspace::{TempWorkspace, STALE_AFTER, WORKSPACE_PREFIX};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        CancellationToken, ModScanner, NoProgress, PatchError, PatchProgress, Patcher,
        ProgressSink, ScanError, ScanOptions, ScanResult, Stage,
    };
    pub use paratool_lspk::{ArchiveWriter, LspkArchive, WriterOptions};
    pub use paratool_lsx::ModuleInfo;
    pub use paratool_stats::{BaseStats, ItemEntry, ItemKind, ModDescriptor, Pool, Rarity};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
