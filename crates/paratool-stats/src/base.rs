//! Base-game stat catalog.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::parser::parse_stats_bytes;
use crate::resolver::StatsResolver;
use crate::Result;

/// Stat entries shipped with the base game.
///
/// Mods inherit from these entries, so every scan resolves against this
/// catalog first. It is built once and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct BaseStats {
    resolver: StatsResolver,
}

impl BaseStats {
    /// Empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from already-parsed entries.
    pub fn from_resolver(resolver: StatsResolver) -> Self {
        Self { resolver }
    }

    /// Parse every `*.txt` file directly inside `dir`, in file name order.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let pattern = format!("{}/*.txt", glob::Pattern::escape(&dir.to_string_lossy()));

        let mut files = glob::glob(&pattern)?.collect::<std::result::Result<Vec<_>, _>>()?;
        files.sort();

        let mut resolver = StatsResolver::new();
        for file in &files {
            let entries = parse_stats_bytes(&fs::read(file)?);
            debug!(file = %file.display(), entries = entries.len(), "loaded base stats");
            resolver.add_entries(entries);
        }

        Ok(Self { resolver })
    }

    /// Resolver over the base entries.
    #[inline]
    pub fn resolver(&self) -> &StatsResolver {
        &self.resolver
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.resolver.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.resolver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_dir_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Armor.txt"),
            "new entry \"_Ring\"\ntype \"Armor\"\ndata \"Slot\" \"Ring\"\n",
        )
        .unwrap();
        // Loaded after Armor.txt, so its definition replaces the earlier one.
        fs::write(
            dir.path().join("Armor_2.txt"),
            "new entry \"_Ring\"\ntype \"Armor\"\ndata \"Slot\" \"Amulet\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.md"), "new entry \"Ignored\"\ntype \"Armor\"\n").unwrap();

        let base = BaseStats::load_dir(dir.path()).unwrap();
        assert_eq!(base.len(), 1);
        assert_eq!(base.resolver().resolve("_Ring", "Slot"), Some("Amulet"));
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let base = BaseStats::load_dir(dir.path().join("absent")).unwrap();
        assert!(base.is_empty());
    }
}
