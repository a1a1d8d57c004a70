//! The patch pipeline.
//!
//! Runs strictly in order on the calling thread:
//!
//! 1. extract the target package into a temporary workspace
//! 2. add item references to `TreasureTable.txt`
//! 3. write price overrides next to the package's generated stats
//! 4. add the contributing mods to the dependencies in `meta.lsx`
//! 5. repack into `<target>.tmp` and move it over the target
//!
//! The target package is only replaced after the repack succeeded, so any
//! failure leaves it byte-identical.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use paratool_lspk::{ArchiveWriter, LspkArchive, WriterOptions};
use paratool_lsx::{patch_dependencies, ModuleInfo};
use paratool_stats::{generate_overrides, ItemEntry, ModDescriptor, OVERRIDES_FILE_NAME};
use paratool_treasure::patch_treasure;

use crate::error::PatchError;
use crate::progress::{CancellationToken, ProgressSink, Stage};
use crate::workspace::{TempWorkspace, STALE_AFTER};

const TREASURE_FILE_NAME: &str = "TreasureTable.txt";
const METADATA_FILE_NAME: &str = "meta.lsx";
const STATS_DIR_SUFFIX: &str = "stats/generated/data";

/// Patcher settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOptions {
    /// Directory that holds the temporary workspaces
    pub temp_root: PathBuf,
    /// Age after which a leftover workspace is removed
    pub stale_after: Duration,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            temp_root: std::env::temp_dir(),
            stale_after: STALE_AFTER,
        }
    }
}

/// Outcome of a successful patch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchSummary {
    /// Enabled items written into the target
    pub items_patched: usize,
    /// Reference lines added to the loot tables
    pub references_added: usize,
}

/// Applies scanned mods to a target package.
#[derive(Debug, Clone, Default)]
pub struct Patcher {
    options: PatchOptions,
}

impl Patcher {
    pub fn new(options: PatchOptions) -> Self {
        Self { options }
    }

    /// Patch `target` with every enabled item in `mods`.
    pub fn patch(
        &self,
        target: &Path,
        mods: &[ModDescriptor],
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<PatchSummary, PatchError> {
        let items: Vec<&ItemEntry> = mods.iter().flat_map(|m| m.enabled_items()).collect();
        if items.is_empty() {
            return Err(PatchError::NoItemsSelected);
        }
        let dependencies: Vec<ModuleInfo> = mods
            .iter()
            .filter(|m| m.enabled_items().next().is_some())
            .map(|m| ModuleInfo::new(m.name.clone(), m.uuid.clone(), m.folder.clone()))
            .collect();

        let workspace =
            TempWorkspace::create_in(&self.options.temp_root, self.options.stale_after)?;
        let root = workspace.subdir("package")?;

        enter(Stage::Extract, progress, cancel)?;
        let writer_options = {
            let archive = LspkArchive::open(target)?;
            let count = archive.extract_all(&root)?;
            debug!("Extracted {} files from {}", count, archive.name());
            let header = archive.header();
            WriterOptions {
                flags: header.flags,
                priority: header.priority,
            }
        };

        enter(Stage::PatchLootTables, progress, cancel)?;
        let treasure_path = find_file(&root, TREASURE_FILE_NAME)?
            .ok_or(PatchError::MissingDocument(TREASURE_FILE_NAME))?;
        let treasure = fs::read_to_string(&treasure_path)?;
        let patched = patch_treasure(&treasure, items.iter().copied());
        fs::write(&treasure_path, patched.text)?;
        info!("Added {} loot table references", patched.references_added);

        enter(Stage::GenerateOverrides, progress, cancel)?;
        let stats_dir = stats_directory(&root)?;
        fs::write(
            stats_dir.join(OVERRIDES_FILE_NAME),
            generate_overrides(items.iter().copied()),
        )?;

        enter(Stage::PatchMetadata, progress, cancel)?;
        let meta_path = find_file(&root, METADATA_FILE_NAME)?
            .ok_or(PatchError::MissingDocument(METADATA_FILE_NAME))?;
        let meta = fs::read_to_string(&meta_path)?;
        fs::write(&meta_path, patch_dependencies(&meta, &dependencies)?)?;

        enter(Stage::Repack, progress, cancel)?;
        replace_package(&root, target, writer_options)?;

        progress.report(Stage::Done.into());
        info!("Patched {} items into {}", items.len(), target.display());

        Ok(PatchSummary {
            items_patched: items.len(),
            references_added: patched.references_added,
        })
    }
}

/// Patch `target` with default options.
pub fn patch(
    target: &Path,
    mods: &[ModDescriptor],
    progress: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<PatchSummary, PatchError> {
    Patcher::default().patch(target, mods, progress, cancel)
}

fn enter(
    stage: Stage,
    progress: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<(), PatchError> {
    if cancel.is_cancelled() {
        info!("Cancelled before: {}", stage);
        return Err(PatchError::Cancelled);
    }
    info!("{}", stage);
    progress.report(stage.into());
    Ok(())
}

/// First file named `name` (case-insensitive) in sorted walk order.
fn find_file(root: &Path, name: &str) -> Result<Option<PathBuf>, PatchError> {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        {
            return Ok(Some(entry.into_path()));
        }
    }
    Ok(None)
}

/// Directory for the overrides file.
///
/// The first `Stats/Generated/Data` directory in the tree, else one created
/// under the first folder in `Public`.
fn stats_directory(root: &Path) -> Result<PathBuf, PatchError> {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() && ends_with_stats_dir(entry.path(), root) {
            return Ok(entry.into_path());
        }
    }

    let public = first_subdir(root, |name| name.eq_ignore_ascii_case("Public"))?
        .ok_or(PatchError::MissingDocument("Stats/Generated/Data"))?;
    let module = first_subdir(&public, |_| true)?
        .ok_or(PatchError::MissingDocument("Stats/Generated/Data"))?;

    let dir = module.join("Stats").join("Generated").join("Data");
    fs::create_dir_all(&dir)?;
    debug!("Created stats directory {}", dir.display());
    Ok(dir)
}

fn ends_with_stats_dir(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root)
        .ok()
        .and_then(|p| p.to_str())
        .is_some_and(|p| {
            p.replace('\\', "/")
                .to_ascii_lowercase()
                .ends_with(STATS_DIR_SUFFIX)
        })
}

fn first_subdir<F>(dir: &Path, accept: F) -> Result<Option<PathBuf>, PatchError>
where
    F: Fn(&str) -> bool,
{
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() && entry.file_name().to_str().is_some_and(&accept) {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs.into_iter().next())
}

/// Pack `root` into `<target>.tmp`, then move it over `target`.
fn replace_package(root: &Path, target: &Path, options: WriterOptions) -> Result<(), PatchError> {
    let mut tmp_name = target.file_name().map(OsString::from).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = target.with_file_name(tmp_name);

    let written = ArchiveWriter::new(options)
        .write_to_path(root, &tmp_path)
        .map_err(PatchError::from)
        .and_then(|summary| {
            fs::rename(&tmp_path, target)?;
            Ok(summary)
        });

    match written {
        Ok(summary) => {
            debug!(
                "Wrote {} files ({} bytes)",
                summary.file_count, summary.package_size
            );
            Ok(())
        }
        Err(e) => {
            if let Err(remove_err) = fs::remove_file(&tmp_path) {
                if remove_err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not remove {}: {}", tmp_path.display(), remove_err);
                }
            }
            Err(e)
        }
    }
}
