//! Inheritance resolution over `using` chains.

use std::sync::Arc;

use crate::entry::{FxHashMap, PropertyMap, StatsEntry};

/// Maximum number of entries visited along a `using` chain.
///
/// Bounds the walk on cyclic or pathologically deep inheritance.
pub const MAX_INHERITANCE_DEPTH: usize = 20;

/// Name-indexed set of stat entries.
///
/// Entries are shared behind [`Arc`], so cloning a resolver copies only the
/// index. A scan worker clones the base catalog and layers one mod's entries
/// on top without touching the shared base.
#[derive(Debug, Clone, Default)]
pub struct StatsResolver {
    entries: FxHashMap<String, Arc<StatsEntry>>,
}

impl StatsResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add entries; an entry replaces any existing entry with the same name.
    pub fn add_entries<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = StatsEntry>,
    {
        self.add_shared(entries.into_iter().map(Arc::new));
    }

    /// Add already-shared entries.
    pub fn add_shared<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = Arc<StatsEntry>>,
    {
        for entry in entries {
            self.entries.insert(entry.name.to_ascii_lowercase(), entry);
        }
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&StatsEntry> {
        self.get_shared(name).map(Arc::as_ref)
    }

    fn get_shared(&self, name: &str) -> Option<&Arc<StatsEntry>> {
        self.entries.get(name.to_ascii_lowercase().as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in unspecified order.
    pub fn entries(&self) -> impl Iterator<Item = &StatsEntry> {
        self.entries.values().map(Arc::as_ref)
    }

    /// Resolve one property, walking up the `using` chain.
    ///
    /// The nearest entry that defines the property wins. Returns `None` when
    /// a link in the chain is missing or the depth bound is reached first.
    pub fn resolve(&self, name: &str, property: &str) -> Option<&str> {
        let mut current = name;

        for _ in 0..MAX_INHERITANCE_DEPTH {
            let entry = self.get_shared(current)?;
            if let Some(value) = entry.properties.get(property) {
                return Some(value);
            }
            current = entry.parent.as_deref()?;
        }

        None
    }

    /// Resolve every property visible from `name`.
    ///
    /// Ancestors are applied first and each descendant overlays them. Only
    /// the first [`MAX_INHERITANCE_DEPTH`] entries of the chain contribute.
    pub fn resolve_all(&self, name: &str) -> PropertyMap {
        let mut chain = Vec::new();
        let mut current = Some(name);

        while let Some(link) = current {
            if chain.len() >= MAX_INHERITANCE_DEPTH {
                break;
            }
            let Some(entry) = self.get_shared(link) else {
                break;
            };
            chain.push(entry);
            current = entry.parent.as_deref();
        }

        let mut result = PropertyMap::new();
        for entry in chain.iter().rev() {
            result.overlay(&entry.properties);
        }
        result
    }
}
