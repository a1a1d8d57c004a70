//! Classified items and the mods that carry them.

use std::path::PathBuf;

use crate::classify::{detect_pool, ItemKind, Pool, Rarity};
use crate::entry::StatsEntry;
use crate::pricing::{self, SlotCategory};
use crate::resolver::StatsResolver;

/// Raw properties resolved along an item's inheritance chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResolvedProperties {
    pub slot: Option<String>,
    pub armor_type: Option<String>,
    pub rarity: Option<String>,
    pub shield: Option<String>,
    pub weapon_properties: Option<String>,
    pub value_override: Option<String>,
    pub unique: Option<String>,
}

impl ResolvedProperties {
    /// Resolve the classification-relevant properties of `name`.
    pub fn resolve(resolver: &StatsResolver, name: &str) -> Self {
        let get = |property: &str| resolver.resolve(name, property).map(str::to_string);
        Self {
            slot: get("Slot"),
            armor_type: get("ArmorType"),
            rarity: get("Rarity"),
            shield: get("Shield"),
            weapon_properties: get("Weapon Properties"),
            value_override: get("ValueOverride"),
            unique: get("Unique"),
        }
    }
}

/// A patchable item: classification plus the user's choices for it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemEntry {
    pub stat_id: String,
    pub kind: ItemKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resolved: ResolvedProperties,
    pub detected_pool: Option<Pool>,
    pub detected_rarity: Option<Rarity>,
    #[cfg_attr(feature = "serde", serde(default = "enabled_by_default"))]
    pub enabled: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub user_pool: Option<Pool>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub user_rarity: Option<Rarity>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub themes: Vec<String>,
}

#[cfg(feature = "serde")]
fn enabled_by_default() -> bool {
    true
}

impl ItemEntry {
    /// Create an enabled item with nothing detected.
    pub fn new(stat_id: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            stat_id: stat_id.into(),
            kind,
            resolved: ResolvedProperties::default(),
            detected_pool: None,
            detected_rarity: None,
            enabled: true,
            user_pool: None,
            user_rarity: None,
            themes: Vec::new(),
        }
    }

    /// Classify a stat entry against `resolver`.
    ///
    /// Returns `None` for non-item entries and for items without a loot pool.
    pub fn from_stats(entry: &StatsEntry, resolver: &StatsResolver) -> Option<Self> {
        let kind = entry.kind()?;
        let resolved = ResolvedProperties::resolve(resolver, &entry.name);

        let pool = detect_pool(
            kind,
            resolved.slot.as_deref(),
            resolved.armor_type.as_deref(),
            resolved.shield.as_deref(),
            resolved.weapon_properties.as_deref(),
        )?;
        let rarity = Rarity::from_stat(resolved.rarity.as_deref());

        Some(Self {
            detected_pool: Some(pool),
            detected_rarity: Some(rarity),
            resolved,
            ..Self::new(entry.name.clone(), kind)
        })
    }

    /// User pool, else detected pool, else [`Pool::Unknown`].
    pub fn effective_pool(&self) -> Pool {
        self.user_pool.or(self.detected_pool).unwrap_or(Pool::Unknown)
    }

    /// User rarity, else detected rarity, else Uncommon.
    pub fn effective_rarity(&self) -> Rarity {
        self.user_rarity.or(self.detected_rarity).unwrap_or_default()
    }

    /// Gold value for the effective pool and rarity.
    pub fn price(&self) -> u32 {
        pricing::price(
            SlotCategory::for_pool(self.effective_pool()),
            self.effective_rarity(),
        )
    }
}

/// A scanned mod and its patchable items.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModDescriptor {
    pub name: String,
    pub uuid: String,
    pub folder: String,
    pub archive_path: PathBuf,
    pub items: Vec<ItemEntry>,
}

impl ModDescriptor {
    /// Items that will be patched.
    pub fn enabled_items(&self) -> impl Iterator<Item = &ItemEntry> {
        self.items.iter().filter(|item| item.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> StatsResolver {
        let mut resolver = StatsResolver::new();
        resolver.add_entries(vec![
            StatsEntry::new("_Ring", "Armor").with_property("Slot", "Ring"),
            StatsEntry::new("_Body", "Armor")
                .with_property("Slot", "Breast")
                .with_property("ArmorType", "Plate"),
            StatsEntry::new("_Longsword", "Weapon")
                .with_property("Slot", "Melee Main Weapon")
                .with_property("Weapon Properties", "Versatile;Melee"),
        ]);
        resolver
    }

    #[test]
    fn test_from_stats_inherits_slot() {
        let mut resolver = base();
        let entry = StatsEntry::new("MAG_Ring", "Armor")
            .with_parent("_Ring")
            .with_property("Rarity", "Rare")
            .with_property("Unique", "1");
        resolver.add_entries(vec![entry.clone()]);

        let item = ItemEntry::from_stats(&entry, &resolver).unwrap();
        assert_eq!(item.kind, ItemKind::Armor);
        assert_eq!(item.detected_pool, Some(Pool::Rings));
        assert_eq!(item.detected_rarity, Some(Rarity::Rare));
        assert_eq!(item.resolved.unique.as_deref(), Some("1"));
        assert!(item.enabled);
        assert_eq!(item.price(), 400);
    }

    #[test]
    fn test_from_stats_weapon() {
        let mut resolver = base();
        let entry = StatsEntry::new("WPN_Blade", "Weapon").with_parent("_Longsword");
        resolver.add_entries(vec![entry.clone()]);

        let item = ItemEntry::from_stats(&entry, &resolver).unwrap();
        assert_eq!(item.effective_pool(), Pool::Weapons1H);
        assert_eq!(item.effective_rarity(), Rarity::Uncommon);
    }

    #[test]
    fn test_from_stats_skips_unpooled() {
        let mut resolver = base();
        let vanity = StatsEntry::new("Vanity", "Armor").with_property("Slot", "VanityBody");
        let passive = StatsEntry::new("Passive", "PassiveData");
        resolver.add_entries(vec![vanity.clone(), passive.clone()]);

        assert!(ItemEntry::from_stats(&vanity, &resolver).is_none());
        assert!(ItemEntry::from_stats(&passive, &resolver).is_none());
    }

    #[test]
    fn test_effective_values() {
        let mut item = ItemEntry::new("X", ItemKind::Armor);
        assert_eq!(item.effective_pool(), Pool::Unknown);
        assert_eq!(item.effective_pool().as_str(), "UNKNOWN");
        assert_eq!(item.effective_rarity(), Rarity::Uncommon);

        item.detected_pool = Some(Pool::Armor);
        item.detected_rarity = Some(Rarity::Rare);
        item.user_pool = Some(Pool::Hats);
        assert_eq!(item.effective_pool(), Pool::Hats);
        assert_eq!(item.effective_rarity(), Rarity::Rare);

        item.user_rarity = Some(Rarity::Legendary);
        assert_eq!(item.price(), 3500);
    }
}
