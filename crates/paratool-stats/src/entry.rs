//! Stat entries and their property maps.

use std::hash::BuildHasherDefault;

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;

use crate::classify::ItemKind;

pub(crate) type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Property map with ASCII case-insensitive keys.
///
/// Keys are stored folded to lowercase; inserting an existing key replaces
/// its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    values: FxHashMap<String, String>,
}

impl PropertyMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a property.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_ascii_lowercase(), value.into());
    }

    /// Look up a property.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key.to_ascii_lowercase().as_str())
            .map(String::as_str)
    }

    /// Check whether a property is defined.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over (folded key, value) pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay every property of `other` onto this map.
    pub fn overlay(&mut self, other: &PropertyMap) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// One `new entry` block of a stat file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsEntry {
    /// Entry name, unique within a resolver (case-insensitive)
    pub name: String,
    /// Declared `type` value
    pub entry_type: String,
    /// Parent entry named by `using`
    pub parent: Option<String>,
    /// `data` properties defined directly on this entry
    pub properties: PropertyMap,
}

impl StatsEntry {
    /// Create an entry without a parent or properties.
    pub fn new(name: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry_type: entry_type.into(),
            parent: None,
            properties: PropertyMap::new(),
        }
    }

    /// Builder-style parent setter.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Builder-style property setter.
    pub fn with_property(mut self, key: &str, value: impl Into<String>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Item kind, if this entry declares an item-bearing type.
    pub fn kind(&self) -> Option<ItemKind> {
        ItemKind::from_type(&self.entry_type)
    }
}
