//! Target tables for each item.

use std::collections::BTreeMap;

use paratool_stats::{ItemEntry, Pool};

/// Subtable spec of pick-all pool tables.
pub const PICK_ALL_SPEC: &str = "-1";

/// Subtable spec of paragon single-pick blocks.
pub const PARAGON_SPEC: &str = "1,1";

/// Reference line that adds an item to a table.
pub fn reference_line(stat_id: &str) -> String {
    format!("object category \"I_{stat_id}\",1,0,0,0,0,0,0,0")
}

/// Paragon table number of a pool.
pub fn paragon_pool_number(pool: Pool) -> Option<u8> {
    match pool {
        Pool::Clothes => Some(1),
        Pool::Armor => Some(2),
        Pool::Shields => Some(3),
        Pool::Hats => Some(4),
        Pool::Cloaks => Some(5),
        Pool::Gloves => Some(6),
        Pool::Boots => Some(7),
        Pool::Amulets => Some(8),
        Pool::Rings => Some(9),
        Pool::Weapons => Some(10),
        Pool::Weapons1H => Some(11),
        Pool::Weapons2H => Some(12),
        Pool::Unknown => None,
    }
}

const THEME_NUMBERS: [(&str, u8); 10] = [
    ("Swamp", 13),
    ("Aquatic", 14),
    ("Shadowfell", 15),
    ("Arcane", 16),
    ("Celestial", 17),
    ("Nature", 18),
    ("Destructive", 19),
    ("War", 20),
    ("Psionic", 21),
    ("Primal", 22),
];

/// Paragon table number of a theme tag (case-insensitive).
pub fn paragon_theme_number(theme: &str) -> Option<u8> {
    THEME_NUMBERS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(theme))
        .map(|&(_, number)| number)
}

fn paragon_table(number: u8) -> String {
    format!("AMP_Para_{number}")
}

/// Reference lines to add, grouped by target table.
///
/// Lines keep item order within a table and are unique per table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableAdditions {
    /// Tables whose `"-1"` subtable receives the lines
    pub pick_all: BTreeMap<String, Vec<String>>,
    /// Tables that receive one `"1,1"` block per line
    pub paragon: BTreeMap<String, Vec<String>>,
}

impl TableAdditions {
    /// Compute target tables for every enabled item.
    pub fn for_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a ItemEntry>,
    {
        let mut additions = Self::default();

        for item in items.into_iter().filter(|item| item.enabled) {
            let pool = item.effective_pool();
            let rt = item.effective_rarity().table_term();
            let line = reference_line(&item.stat_id);

            additions.add_pick_all(format!("REL_{rt}_{pool}"), &line);
            additions.add_pick_all(format!("REL_All_{rt}"), &line);

            if pool.is_handed_weapon() {
                additions.add_pick_all(format!("REL_{rt}_Weapons"), &line);
                additions.add_paragon(paragon_table(10), &line);
            }

            for theme in &item.themes {
                additions.add_pick_all(format!("REL_{rt}_{theme}"), &line);
                if let Some(number) = paragon_theme_number(theme) {
                    additions.add_paragon(paragon_table(number), &line);
                }
            }

            if let Some(number) = paragon_pool_number(pool) {
                additions.add_paragon(paragon_table(number), &line);
            }
        }

        additions
    }

    pub fn is_empty(&self) -> bool {
        self.pick_all.is_empty() && self.paragon.is_empty()
    }

    fn add_pick_all(&mut self, table: String, line: &str) {
        add_unique(&mut self.pick_all, table, line);
    }

    fn add_paragon(&mut self, table: String, line: &str) {
        add_unique(&mut self.paragon, table, line);
    }
}

fn add_unique(map: &mut BTreeMap<String, Vec<String>>, table: String, line: &str) {
    let lines = map.entry(table).or_default();
    if !lines.iter().any(|existing| existing == line) {
        lines.push(line.to_string());
    }
}
