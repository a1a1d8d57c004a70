//! Loot pool and rarity classification.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Item-bearing stat entry types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    Armor,
    Weapon,
}

impl ItemKind {
    /// Map a declared `type` value. Matching is exact.
    pub fn from_type(entry_type: &str) -> Option<Self> {
        match entry_type {
            "Armor" => Some(Self::Armor),
            "Weapon" => Some(Self::Weapon),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Armor => "Armor",
            Self::Weapon => "Weapon",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loot pool an item is distributed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pool {
    Clothes,
    Armor,
    Shields,
    Hats,
    Cloaks,
    Gloves,
    Boots,
    Amulets,
    Rings,
    Weapons,
    #[cfg_attr(feature = "serde", serde(rename = "Weapons_1H"))]
    Weapons1H,
    #[cfg_attr(feature = "serde", serde(rename = "Weapons_2H"))]
    Weapons2H,
    /// Placeholder for items without a detected or chosen pool.
    #[cfg_attr(feature = "serde", serde(rename = "UNKNOWN"))]
    Unknown,
}

impl Pool {
    /// Every assignable pool, in paragon-table order.
    pub const ALL: [Pool; 12] = [
        Pool::Clothes,
        Pool::Armor,
        Pool::Shields,
        Pool::Hats,
        Pool::Cloaks,
        Pool::Gloves,
        Pool::Boots,
        Pool::Amulets,
        Pool::Rings,
        Pool::Weapons,
        Pool::Weapons1H,
        Pool::Weapons2H,
    ];

    /// Name used in loot table identifiers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clothes => "Clothes",
            Self::Armor => "Armor",
            Self::Shields => "Shields",
            Self::Hats => "Hats",
            Self::Cloaks => "Cloaks",
            Self::Gloves => "Gloves",
            Self::Boots => "Boots",
            Self::Amulets => "Amulets",
            Self::Rings => "Rings",
            Self::Weapons => "Weapons",
            Self::Weapons1H => "Weapons_1H",
            Self::Weapons2H => "Weapons_2H",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// One- and two-handed weapon pools.
    pub fn is_handed_weapon(self) -> bool {
        matches!(self, Self::Weapons1H | Self::Weapons2H)
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pool::ALL
            .into_iter()
            .chain([Pool::Unknown])
            .find(|pool| pool.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownPool(s.to_string()))
    }
}

/// Rarity tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rarity {
    #[default]
    Uncommon,
    Rare,
    VeryRare,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::VeryRare,
        Rarity::Legendary,
    ];

    /// Map a resolved `Rarity` property; anything unrecognised is Uncommon.
    pub fn from_stat(value: Option<&str>) -> Self {
        match value {
            Some("Rare") => Self::Rare,
            Some("VeryRare") => Self::VeryRare,
            Some("Legendary") => Self::Legendary,
            _ => Self::Uncommon,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::VeryRare => "VeryRare",
            Self::Legendary => "Legendary",
        }
    }

    /// Term used for this tier in loot table names.
    pub fn table_term(self) -> &'static str {
        match self {
            Self::VeryRare => "Epic",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rarity::ALL
            .into_iter()
            .find(|rarity| rarity.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownRarity(s.to_string()))
    }
}

/// Detect the loot pool from resolved stat properties.
///
/// `None` means the item has no loot pool (vanity gear, instruments,
/// unknown armor slots) and is not offered for patching.
pub fn detect_pool(
    kind: ItemKind,
    slot: Option<&str>,
    armor_type: Option<&str>,
    shield: Option<&str>,
    weapon_properties: Option<&str>,
) -> Option<Pool> {
    if shield.is_some_and(|s| s.eq_ignore_ascii_case("Yes")) {
        return Some(Pool::Shields);
    }

    match kind {
        ItemKind::Weapon => Some(match slot {
            Some("Melee Main Weapon") if is_one_handed(weapon_properties) => Pool::Weapons1H,
            Some("Melee Main Weapon") => Pool::Weapons,
            Some("Melee Offhand Weapon") | Some("Ranged Offhand Weapon") => Pool::Weapons1H,
            Some("Ranged Main Weapon") => Pool::Weapons2H,
            _ => Pool::Weapons,
        }),
        ItemKind::Armor => match slot? {
            "Breast" if is_cloth(armor_type) => Some(Pool::Clothes),
            "Breast" => Some(Pool::Armor),
            "Helmet" => Some(Pool::Hats),
            "Cloak" => Some(Pool::Cloaks),
            "Gloves" => Some(Pool::Gloves),
            "Boots" => Some(Pool::Boots),
            "Amulet" => Some(Pool::Amulets),
            "Ring" => Some(Pool::Rings),
            _ => None,
        },
    }
}

fn is_one_handed(weapon_properties: Option<&str>) -> bool {
    match weapon_properties {
        Some(props) if !props.is_empty() => !contains_ignore_ascii_case(props, "Two-Handed"),
        _ => false,
    }
}

fn is_cloth(armor_type: Option<&str>) -> bool {
    match armor_type {
        None => true,
        Some(t) => t.is_empty() || t.eq_ignore_ascii_case("None") || t.eq_ignore_ascii_case("Cloth"),
    }
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armor(slot: &str, armor_type: Option<&str>) -> Option<Pool> {
        detect_pool(ItemKind::Armor, Some(slot), armor_type, None, None)
    }

    fn weapon(slot: &str, props: Option<&str>) -> Option<Pool> {
        detect_pool(ItemKind::Weapon, Some(slot), None, None, props)
    }

    #[test]
    fn test_armor_slots() {
        assert_eq!(armor("Ring", None), Some(Pool::Rings));
        assert_eq!(armor("Amulet", None), Some(Pool::Amulets));
        assert_eq!(armor("Helmet", None), Some(Pool::Hats));
        assert_eq!(armor("Cloak", None), Some(Pool::Cloaks));
        assert_eq!(armor("Gloves", None), Some(Pool::Gloves));
        assert_eq!(armor("Boots", None), Some(Pool::Boots));
    }

    #[test]
    fn test_breast_splits_on_armor_type() {
        assert_eq!(armor("Breast", None), Some(Pool::Clothes));
        assert_eq!(armor("Breast", Some("")), Some(Pool::Clothes));
        assert_eq!(armor("Breast", Some("none")), Some(Pool::Clothes));
        assert_eq!(armor("Breast", Some("Cloth")), Some(Pool::Clothes));
        assert_eq!(armor("Breast", Some("Plate")), Some(Pool::Armor));
        assert_eq!(armor("Breast", Some("Leather")), Some(Pool::Armor));
    }

    #[test]
    fn test_unpooled_slots() {
        assert_eq!(armor("MusicalInstrument", None), None);
        assert_eq!(armor("Underwear", None), None);
        assert_eq!(armor("VanityBody", None), None);
        assert_eq!(armor("SomethingNew", None), None);
        assert_eq!(detect_pool(ItemKind::Armor, None, None, None, None), None);
    }

    #[test]
    fn test_shield_wins() {
        assert_eq!(
            detect_pool(ItemKind::Armor, Some("Melee Offhand Weapon"), None, Some("yes"), None),
            Some(Pool::Shields)
        );
        assert_eq!(
            detect_pool(ItemKind::Weapon, Some("Ring"), None, Some("YES"), None),
            Some(Pool::Shields)
        );
        assert_eq!(
            detect_pool(ItemKind::Armor, Some("Ring"), None, Some("No"), None),
            Some(Pool::Rings)
        );
    }

    #[test]
    fn test_weapon_slots() {
        assert_eq!(
            weapon("Melee Main Weapon", Some("Finesse;Light;Melee")),
            Some(Pool::Weapons1H)
        );
        assert_eq!(
            weapon("Melee Main Weapon", Some("Heavy;two-handed;Melee")),
            Some(Pool::Weapons)
        );
        assert_eq!(weapon("Melee Main Weapon", None), Some(Pool::Weapons));
        assert_eq!(weapon("Melee Main Weapon", Some("")), Some(Pool::Weapons));
        assert_eq!(weapon("Melee Offhand Weapon", None), Some(Pool::Weapons1H));
        assert_eq!(weapon("Ranged Main Weapon", None), Some(Pool::Weapons2H));
        assert_eq!(weapon("Ranged Offhand Weapon", None), Some(Pool::Weapons1H));
        assert_eq!(weapon("Something", None), Some(Pool::Weapons));
        assert_eq!(
            detect_pool(ItemKind::Weapon, None, None, None, None),
            Some(Pool::Weapons)
        );
    }

    #[test]
    fn test_rarity_mapping() {
        assert_eq!(Rarity::from_stat(Some("Rare")), Rarity::Rare);
        assert_eq!(Rarity::from_stat(Some("VeryRare")), Rarity::VeryRare);
        assert_eq!(Rarity::from_stat(Some("Legendary")), Rarity::Legendary);
        assert_eq!(Rarity::from_stat(Some("Common")), Rarity::Uncommon);
        assert_eq!(Rarity::from_stat(None), Rarity::Uncommon);
        assert_eq!(Rarity::VeryRare.table_term(), "Epic");
        assert_eq!(Rarity::Rare.table_term(), "Rare");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("weapons_1h".parse::<Pool>().unwrap(), Pool::Weapons1H);
        assert_eq!("UNKNOWN".parse::<Pool>().unwrap(), Pool::Unknown);
        assert!("Belts".parse::<Pool>().is_err());
        assert_eq!("veryrare".parse::<Rarity>().unwrap(), Rarity::VeryRare);
    }
}
