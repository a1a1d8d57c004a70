//! Value-override stat file.

use std::fmt::Write;

use crate::item::ItemEntry;

/// File name of the generated override file inside the stats directory.
pub const OVERRIDES_FILE_NAME: &str = "ParaTool_Overrides.txt";

/// Render override entries that pin the value of every enabled item.
///
/// Each item gets an entry that inherits from itself, sets `ValueOverride`
/// to the grid price and clears `Unique`.
pub fn generate_overrides<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a ItemEntry>,
{
    let mut out = String::new();

    for item in items.into_iter().filter(|item| item.enabled) {
        write!(
            out,
            "new entry \"{id}\"\n\
             type \"{kind}\"\n\
             using \"{id}\"\n\
             data \"ValueOverride\" \"{price}\"\n\
             data \"Unique\" \"\"\n\n",
            id = item.stat_id,
            kind = item.kind,
            price = item.price(),
        )
        .ok();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ItemKind, Pool, Rarity};
    use crate::parser::parse_stats;

    fn item(id: &str, kind: ItemKind, pool: Pool, rarity: Rarity) -> ItemEntry {
        ItemEntry {
            detected_pool: Some(pool),
            detected_rarity: Some(rarity),
            ..ItemEntry::new(id, kind)
        }
    }

    #[test]
    fn test_output_format() {
        let items = [item("MAG_Ring99", ItemKind::Armor, Pool::Rings, Rarity::Rare)];

        assert_eq!(
            generate_overrides(&items),
            "new entry \"MAG_Ring99\"\n\
             type \"Armor\"\n\
             using \"MAG_Ring99\"\n\
             data \"ValueOverride\" \"400\"\n\
             data \"Unique\" \"\"\n\n"
        );
    }

    #[test]
    fn test_disabled_items_are_skipped() {
        let mut skipped = item("MAG_Skipped", ItemKind::Armor, Pool::Rings, Rarity::Rare);
        skipped.enabled = false;
        let kept = item("WPN_TestBlade", ItemKind::Weapon, Pool::Weapons, Rarity::VeryRare);

        let out = generate_overrides([&skipped, &kept]);
        assert!(!out.contains("MAG_Skipped"));
        assert!(out.contains("data \"ValueOverride\" \"1100\""));
    }

    #[test]
    fn test_output_parses_back() {
        let items = [
            item("A", ItemKind::Armor, Pool::Hats, Rarity::Legendary),
            item("B", ItemKind::Weapon, Pool::Shields, Rarity::Uncommon),
        ];
        let entries = parse_stats(&generate_overrides(&items));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].parent.as_deref(), Some("A"));
        assert_eq!(entries[0].properties.get("ValueOverride"), Some("3500"));
        assert_eq!(entries[1].entry_type, "Weapon");
        assert_eq!(entries[1].properties.get("Unique"), Some(""));
    }
}
