//! Stat entry text parser.
//!
//! ```text
//! new entry "ARM_Ring_Example"
//! type "Armor"
//! using "_Ring"
//! data "Rarity" "Rare"
//! ```

use paratool_common::text::{first_quoted, quoted_pair};

use crate::entry::{PropertyMap, StatsEntry};

/// Entry being accumulated until the next `new entry` line.
struct PendingEntry {
    name: String,
    entry_type: Option<String>,
    parent: Option<String>,
    properties: PropertyMap,
}

impl PendingEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entry_type: None,
            parent: None,
            properties: PropertyMap::new(),
        }
    }

    /// Entries without a `type` line are dropped.
    fn finish(self) -> Option<StatsEntry> {
        Some(StatsEntry {
            name: self.name,
            entry_type: self.entry_type?,
            parent: self.parent,
            properties: self.properties,
        })
    }
}

/// Parse stat entries from text.
///
/// Lines are trimmed and unknown lines are ignored. Within an entry, a later
/// `data` line for the same key replaces the earlier value.
pub fn parse_stats(text: &str) -> Vec<StatsEntry> {
    let mut entries = Vec::new();
    let mut pending: Option<PendingEntry> = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }

        if line.starts_with("new entry ") {
            entries.extend(pending.take().and_then(PendingEntry::finish));
            pending = Some(PendingEntry::new(first_quoted(line)));
            continue;
        }

        let Some(current) = pending.as_mut() else {
            continue;
        };

        if line.starts_with("type ") {
            current.entry_type = Some(first_quoted(line).to_string());
        } else if line.starts_with("using ") {
            current.parent = Some(first_quoted(line).to_string());
        } else if line.starts_with("data ") {
            if let Some((key, value)) = quoted_pair(line) {
                current.properties.insert(key, value);
            }
        }
    }

    entries.extend(pending.and_then(PendingEntry::finish));
    entries
}

/// Parse stat entries from UTF-8 bytes, replacing invalid sequences.
pub fn parse_stats_bytes(bytes: &[u8]) -> Vec<StatsEntry> {
    parse_stats(&String::from_utf8_lossy(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_entry() {
        let text = r#"
new entry "MAG_Ring_Of_Example"
type "Armor"
using "_Ring"
data "Rarity" "Rare"
data "ValueOverride" "100"
"#;
        let entries = parse_stats(text);

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.name, "MAG_Ring_Of_Example");
        assert_eq!(entry.entry_type, "Armor");
        assert_eq!(entry.parent.as_deref(), Some("_Ring"));
        assert_eq!(entry.properties.get("rarity"), Some("Rare"));
    }

    #[test]
    fn test_parse_multiple_entries() {
        let text = "new entry \"A\"\ntype \"Armor\"\n\nnew entry \"B\"\r\ntype \"Weapon\"\r\ndata \"Slot\" \"Melee Main Weapon\"\r\n";
        let entries = parse_stats(text);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name, "B");
        assert_eq!(entries[1].properties.get("Slot"), Some("Melee Main Weapon"));
    }

    #[test]
    fn test_entry_without_type_is_dropped() {
        let text = "new entry \"NoType\"\ndata \"Slot\" \"Ring\"\nnew entry \"Typed\"\ntype \"Armor\"\n";
        let entries = parse_stats(text);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Typed");
    }

    #[test]
    fn test_last_data_value_wins() {
        let text = "new entry \"A\"\ntype \"Armor\"\ndata \"Rarity\" \"Rare\"\ndata \"rarity\" \"Legendary\"\n";
        let entries = parse_stats(text);

        assert_eq!(entries[0].properties.get("Rarity"), Some("Legendary"));
        assert_eq!(entries[0].properties.len(), 1);
    }

    #[test]
    fn test_malformed_data_lines() {
        let text = concat!(
            "new entry \"A\"\n",
            "type \"Armor\"\n",
            "data \"Unterminated\n",
            "data \"NoValue\"\n",
            "data \"Open\" \"rest of line\n",
            "data without quotes\n",
            "something else entirely\n",
        );
        let entries = parse_stats(text);
        let props = &entries[0].properties;

        assert_eq!(props.get("Unterminated"), None);
        assert_eq!(props.get("NoValue"), Some(""));
        assert_eq!(props.get("Open"), Some("rest of line"));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn test_data_before_first_entry_is_ignored() {
        let text = "data \"Slot\" \"Ring\"\ntype \"Armor\"\nnew entry \"A\"\ntype \"Armor\"\n";
        let entries = parse_stats(text);

        assert_eq!(entries.len(), 1);
        assert!(entries[0].properties.is_empty());
    }

    #[test]
    fn test_lossy_bytes() {
        let bytes = b"new entry \"Caf\xFF\"\ntype \"Armor\"\n";
        let entries = parse_stats_bytes(bytes);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Caf\u{FFFD}");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_stats("").is_empty());
        assert!(parse_stats("\n\n   \n").is_empty());
    }
}
