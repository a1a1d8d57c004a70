//! Mod discovery.
//!
//! A mods directory holds exactly one target package (the loot aggregator)
//! and any number of item mods. Every mod is opened on its own rayon worker,
//! its stat files are layered over the shared base catalog, and each Armor or
//! Weapon entry the mod defines is classified into a loot pool.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use paratool_lspk::{FileRecord, LspkArchive};
use paratool_lsx::ModuleInfo;
use paratool_stats::{parse_stats_bytes, BaseStats, ItemEntry, ModDescriptor};

use crate::error::ScanError;
use crate::progress::ScanProgress;

/// Directory that holds generated stat files inside a package.
const STATS_DIR_MARKER: &str = "/stats/generated/data/";

/// Scanner settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// File name prefix of the target package (case-insensitive)
    pub target_prefix: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            target_prefix: "REL_Full_Ancient_".to_string(),
        }
    }
}

/// Outcome of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanResult {
    /// Mods with at least one item, sorted by name
    pub mods: Vec<ModDescriptor>,
    /// The package to patch
    pub target_archive: PathBuf,
}

impl ScanResult {
    /// Total number of items across all mods.
    pub fn item_count(&self) -> usize {
        self.mods.iter().map(|m| m.items.len()).sum()
    }
}

/// Finds the target package and classifies the items of every other mod.
#[derive(Debug)]
pub struct ModScanner<'a> {
    base: &'a BaseStats,
    options: ScanOptions,
}

impl<'a> ModScanner<'a> {
    pub fn new(base: &'a BaseStats) -> Self {
        Self::with_options(base, ScanOptions::default())
    }

    pub fn with_options(base: &'a BaseStats, options: ScanOptions) -> Self {
        Self { base, options }
    }

    /// Scan every package in `mods_dir`.
    ///
    /// `progress` is called from worker threads after each package.
    /// Packages that fail to open or parse are skipped.
    pub fn scan<P, F>(&self, mods_dir: P, progress: F) -> Result<ScanResult, ScanError>
    where
        P: AsRef<Path>,
        F: Fn(ScanProgress) + Sync,
    {
        let mods_dir = mods_dir.as_ref();
        if !mods_dir.is_dir() {
            return Err(ScanError::NotADirectory(mods_dir.to_path_buf()));
        }

        let packages = list_packages(mods_dir)?;
        if packages.is_empty() {
            return Err(ScanError::NoArchives);
        }

        let (targets, others): (Vec<PathBuf>, Vec<PathBuf>) = packages
            .into_iter()
            .partition(|path| self.is_target(path));

        let target_archive = match <[PathBuf; 1]>::try_from(targets) {
            Ok([target]) => target,
            Err(targets) if targets.is_empty() => {
                return Err(ScanError::TargetMissing {
                    prefix: self.options.target_prefix.clone(),
                })
            }
            Err(targets) => return Err(ScanError::MultipleTargets(targets)),
        };
        info!(
            "Target package {}, scanning {} mods",
            target_archive.display(),
            others.len()
        );

        let total = others.len();
        let scanned = AtomicUsize::new(0);
        let found = Mutex::new(Vec::new());

        others.par_iter().for_each(|path| {
            match self.scan_package(path) {
                Ok(Some(descriptor)) => {
                    debug!(
                        "{}: {} items",
                        descriptor.name,
                        descriptor.items.len()
                    );
                    found.lock().push(descriptor);
                }
                Ok(None) => debug!("{}: no items", path.display()),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }

            let done = scanned.fetch_add(1, Ordering::Relaxed) + 1;
            let mods_found = found.lock().len();
            progress(ScanProgress {
                scanned: done,
                total,
                mods_found,
            });
        });

        let mut mods = found.into_inner();
        mods.sort_by_cached_key(|m| m.name.to_lowercase());

        info!("Found {} mods with items", mods.len());
        Ok(ScanResult {
            mods,
            target_archive,
        })
    }

    /// Scan a single mod package.
    ///
    /// Returns `None` when the package has no module metadata, no stat
    /// files, or no classifiable items.
    pub fn scan_package(&self, path: &Path) -> Result<Option<ModDescriptor>, ScanError> {
        let archive = LspkArchive::open(path)?;

        let Some(meta) = archive.iter().find(|r| is_metadata(r)) else {
            return Ok(None);
        };
        let Some(info) = ModuleInfo::from_lsx(&archive.read(meta)?)? else {
            return Ok(None);
        };

        let mut entries = Vec::new();
        for record in archive.iter().filter(|r| is_stats_file(r)) {
            entries.extend(parse_stats_bytes(&archive.read(record)?));
        }
        if entries.is_empty() {
            return Ok(None);
        }

        let entries: Vec<Arc<_>> = entries.into_iter().map(Arc::new).collect();
        let mut resolver = self.base.resolver().clone();
        resolver.add_shared(entries.iter().cloned());

        let items: Vec<ItemEntry> = entries
            .iter()
            .filter_map(|entry| ItemEntry::from_stats(entry, &resolver))
            .collect();
        if items.is_empty() {
            return Ok(None);
        }

        Ok(Some(ModDescriptor {
            name: info.name,
            uuid: info.uuid,
            folder: info.folder,
            archive_path: path.to_path_buf(),
            items,
        }))
    }

    fn is_target(&self, path: &Path) -> bool {
        let prefix = self.options.target_prefix.as_bytes();
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| {
                name.len() >= prefix.len()
                    && name.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix)
            })
    }
}

/// List `*.pak` files in `dir` (not recursive), sorted.
fn list_packages(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let pattern = format!("{}/*.pak", glob::Pattern::escape(&dir.to_string_lossy()));
    let options = glob::MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };

    let mut packages = Vec::new();
    for path in glob::glob_with(&pattern, options)? {
        let path = path?;
        if path.is_file() {
            packages.push(path);
        }
    }
    packages.sort();
    Ok(packages)
}

fn normalized_lower(record: &FileRecord) -> String {
    record.path.replace('\\', "/").to_lowercase()
}

fn is_metadata(record: &FileRecord) -> bool {
    normalized_lower(record).ends_with("meta.lsx")
}

fn is_stats_file(record: &FileRecord) -> bool {
    let path = normalized_lower(record);
    path.contains(STATS_DIR_MARKER) && path.ends_with(".txt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use paratool_lspk::ArchiveWriter;
    use paratool_stats::{ItemKind, Pool, Rarity, StatsEntry, StatsResolver};
    use std::fs;

    fn meta_lsx(name: &str, uuid: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<save>
  <region id="Config">
    <node id="root">
      <children>
        <node id="ModuleInfo">
          <attribute id="Folder" type="LSString" value="{name}Folder"/>
          <attribute id="Name" type="LSString" value="{name}"/>
          <attribute id="UUID" type="FixedString" value="{uuid}"/>
        </node>
      </children>
    </node>
  </region>
</save>
"#
        )
    }

    fn write_package(dir: &Path, file_name: &str, files: &[(&str, &str)]) -> PathBuf {
        let staging = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = staging.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        let output = dir.join(file_name);
        ArchiveWriter::default()
            .write_to_path(staging.path(), &output)
            .unwrap();
        output
    }

    fn base_stats() -> BaseStats {
        let mut resolver = StatsResolver::new();
        resolver.add_entries([StatsEntry::new("_BaseRing", "Armor")
            .with_property("Slot", "Ring")
            .with_property("Rarity", "Uncommon")]);
        BaseStats::from_resolver(resolver)
    }

    fn ring_mod(dir: &Path, file_name: &str, name: &str, uuid: &str) -> PathBuf {
        let meta = meta_lsx(name, uuid);
        let stats = format!(
            "new entry \"{name}_Ring\"\ntype \"Armor\"\nusing \"_BaseRing\"\ndata \"Rarity\" \"Rare\"\n\n\
             new entry \"{name}_Potion\"\ntype \"Object\"\n"
        );
        let meta_path = format!("Mods/{name}/meta.lsx");
        let stats_path = format!("Public/{name}/Stats/Generated/Data/Armor.txt");
        write_package(
            dir,
            file_name,
            &[
                (meta_path.as_str(), meta.as_str()),
                (stats_path.as_str(), stats.as_str()),
            ],
        )
    }

    #[test]
    fn test_scan_finds_target_and_mods() {
        let dir = tempfile::tempdir().unwrap();
        let base = base_stats();
        let target = write_package(dir.path(), "REL_Full_Ancient_v1.pak", &[("a.txt", "x")]);
        ring_mod(dir.path(), "zeta.pak", "Zeta", "uuid-z");
        ring_mod(dir.path(), "alpha.pak", "alpha", "uuid-a");
        write_package(dir.path(), "textures.pak", &[("Public/T/tex.dds", "dds")]);

        let calls = AtomicUsize::new(0);
        let result = ModScanner::new(&base)
            .scan(dir.path(), |p| {
                calls.fetch_add(1, Ordering::Relaxed);
                assert_eq!(p.total, 3);
            })
            .unwrap();

        assert_eq!(result.target_archive, target);
        assert_eq!(calls.load(Ordering::Relaxed), 3);

        let names: Vec<&str> = result.mods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Zeta"]);
        assert_eq!(result.item_count(), 2);

        let item = &result.mods[1].items[0];
        assert_eq!(item.stat_id, "Zeta_Ring");
        assert_eq!(item.kind, ItemKind::Armor);
        assert_eq!(item.detected_pool, Some(Pool::Rings));
        assert_eq!(item.detected_rarity, Some(Rarity::Rare));
        assert!(item.enabled);
        assert_eq!(result.mods[1].uuid, "uuid-z");
        assert_eq!(result.mods[1].folder, "ZetaFolder");
    }

    #[test]
    fn test_scan_target_prefix_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let base = BaseStats::empty();
        write_package(dir.path(), "rel_full_ancient_lower.pak", &[("a.txt", "x")]);

        let result = ModScanner::new(&base).scan(dir.path(), |_| {}).unwrap();
        assert!(result.mods.is_empty());
        assert!(result
            .target_archive
            .ends_with("rel_full_ancient_lower.pak"));
    }

    #[test]
    fn test_scan_custom_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let base = BaseStats::empty();
        write_package(dir.path(), "Loot_Target.pak", &[("a.txt", "x")]);

        let options = ScanOptions {
            target_prefix: "loot_".to_string(),
        };
        let result = ModScanner::with_options(&base, options)
            .scan(dir.path(), |_| {})
            .unwrap();
        assert!(result.target_archive.ends_with("Loot_Target.pak"));
    }

    #[test]
    fn test_scan_no_archives() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), "not a package").unwrap();
        let base = BaseStats::empty();

        let err = ModScanner::new(&base).scan(dir.path(), |_| {}).unwrap_err();
        assert!(matches!(err, ScanError::NoArchives));
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let base = BaseStats::empty();

        let err = ModScanner::new(&base)
            .scan(dir.path().join("absent"), |_| {})
            .unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory(_)));
    }

    #[test]
    fn test_scan_target_missing() {
        let dir = tempfile::tempdir().unwrap();
        let base = base_stats();
        ring_mod(dir.path(), "mod.pak", "Mod", "uuid");

        let err = ModScanner::new(&base).scan(dir.path(), |_| {}).unwrap_err();
        assert!(matches!(err, ScanError::TargetMissing { .. }));
    }

    #[test]
    fn test_scan_multiple_targets() {
        let dir = tempfile::tempdir().unwrap();
        let base = BaseStats::empty();
        write_package(dir.path(), "REL_Full_Ancient_a.pak", &[("a.txt", "x")]);
        write_package(dir.path(), "REL_Full_Ancient_b.pak", &[("a.txt", "x")]);

        let err = ModScanner::new(&base).scan(dir.path(), |_| {}).unwrap_err();
        match err {
            ScanError::MultipleTargets(paths) => assert_eq!(paths.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_scan_skips_corrupt_package() {
        let dir = tempfile::tempdir().unwrap();
        let base = base_stats();
        write_package(dir.path(), "REL_Full_Ancient_v1.pak", &[("a.txt", "x")]);
        fs::write(dir.path().join("broken.pak"), b"not an lspk package").unwrap();
        ring_mod(dir.path(), "good.pak", "Good", "uuid-g");

        let result = ModScanner::new(&base).scan(dir.path(), |_| {}).unwrap();
        assert_eq!(result.mods.len(), 1);
        assert_eq!(result.mods[0].name, "Good");
    }

    #[test]
    fn test_scan_skips_package_with_absurd_file_count() {
        let dir = tempfile::tempdir().unwrap();
        let base = base_stats();
        write_package(dir.path(), "REL_Full_Ancient_v1.pak", &[("a.txt", "x")]);
        ring_mod(dir.path(), "good.pak", "Good", "uuid-g");

        let bad = ring_mod(dir.path(), "bad.pak", "Bad", "uuid-b");
        let mut bytes = fs::read(&bad).unwrap();
        let header = paratool_lspk::read_header(&bytes).unwrap();
        let count_at = header.file_list_offset as usize;
        bytes[count_at..count_at + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        fs::write(&bad, bytes).unwrap();

        let scanner = ModScanner::new(&base);
        assert!(matches!(
            scanner.scan_package(&bad),
            Err(ScanError::Archive(paratool_lspk::Error::ImplausibleSize { .. }))
        ));

        let result = scanner.scan(dir.path(), |_| {}).unwrap();
        let names: Vec<&str> = result.mods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Good"]);
    }

    #[test]
    fn test_scan_package_without_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let base = base_stats();
        let path = write_package(
            dir.path(),
            "nometa.pak",
            &[(
                "Public/X/Stats/Generated/Data/Armor.txt",
                "new entry \"X\"\ntype \"Armor\"\nusing \"_BaseRing\"\n",
            )],
        );

        let scanner = ModScanner::new(&base);
        assert!(scanner.scan_package(&path).unwrap().is_none());
    }

    #[test]
    fn test_scan_ignores_base_entries() {
        let dir = tempfile::tempdir().unwrap();
        let base = base_stats();
        let meta = meta_lsx("Plain", "uuid-p");
        let path = write_package(
            dir.path(),
            "plain.pak",
            &[
                ("Mods/Plain/meta.lsx", meta.as_str()),
                (
                    "Public/Plain/Stats/Generated/Data/Object.txt",
                    "new entry \"Gem\"\ntype \"Object\"\n",
                ),
            ],
        );

        let scanner = ModScanner::new(&base);
        assert!(scanner.scan_package(&path).unwrap().is_none());
    }
}
