//! Gold values by slot category and rarity.

use crate::classify::{Pool, Rarity};

/// Price used when a rarity name is not recognised.
pub const DEFAULT_PRICE: u32 = 200;

/// Pricing group of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotCategory {
    Ring,
    /// Gloves, boots and cloaks
    Accessory,
    /// Body armor and clothes; also the fallback for unmapped pools
    Armor,
    Amulet,
    Weapon,
    Shield,
    Hat,
}

impl SlotCategory {
    pub fn for_pool(pool: Pool) -> Self {
        match pool {
            Pool::Rings => Self::Ring,
            Pool::Gloves | Pool::Boots | Pool::Cloaks => Self::Accessory,
            Pool::Amulets => Self::Amulet,
            Pool::Weapons | Pool::Weapons1H | Pool::Weapons2H => Self::Weapon,
            Pool::Shields => Self::Shield,
            Pool::Hats => Self::Hat,
            Pool::Armor | Pool::Clothes | Pool::Unknown => Self::Armor,
        }
    }
}

/// Price of an item in `category` at `rarity`.
pub fn price(category: SlotCategory, rarity: Rarity) -> u32 {
    use SlotCategory::*;

    // Uncommon, Rare, VeryRare, Legendary
    let row: [u32; 4] = match category {
        Ring | Accessory => [150, 400, 800, 2500],
        Armor | Amulet => [200, 500, 1000, 3000],
        Weapon => [250, 550, 1100, 3300],
        Shield => [250, 550, 1100, 3100],
        Hat => [300, 600, 1200, 3500],
    };
    row[rarity as usize]
}

/// Price lookup by rarity name, falling back to [`DEFAULT_PRICE`].
pub fn price_by_name(category: SlotCategory, rarity: &str) -> u32 {
    Rarity::ALL
        .into_iter()
        .find(|r| r.as_str() == rarity)
        .map_or(DEFAULT_PRICE, |r| price(category, r))
}
