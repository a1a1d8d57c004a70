//! Treasure table document model.

use paratool_common::text::first_quoted;

/// A `new subtable` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtable {
    /// Selection spec, e.g. `-1` (pick all) or `1,1` (pick one)
    pub spec: String,
    /// Trimmed `object category` lines
    pub items: Vec<String>,
}

/// A `new treasuretable` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreasureTable {
    pub name: String,
    pub subtables: Vec<Subtable>,
}

impl TreasureTable {
    /// Subtables with the given spec.
    pub fn subtables_with_spec<'a>(&'a self, spec: &'a str) -> impl Iterator<Item = &'a Subtable> {
        self.subtables.iter().filter(move |s| s.spec == spec)
    }

    /// Every reference line in the table.
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.subtables
            .iter()
            .flat_map(|s| s.items.iter().map(String::as_str))
    }
}

/// Parsed treasure table file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreasureDocument {
    pub tables: Vec<TreasureTable>,
}

impl TreasureDocument {
    /// Find a table by exact name; the last one wins on duplicates.
    pub fn table(&self, name: &str) -> Option<&TreasureTable> {
        self.tables.iter().rev().find(|t| t.name == name)
    }
}

/// Parse a treasure table document.
///
/// Subtables outside a table and reference lines outside a subtable are
/// ignored, as are all other statements.
pub fn parse_treasure(text: &str) -> TreasureDocument {
    let mut doc = TreasureDocument::default();
    let (_, body) = split_bom(text);

    for line in body.lines().map(str::trim) {
        if line.starts_with("new treasuretable ") {
            doc.tables.push(TreasureTable {
                name: first_quoted(line).to_string(),
                subtables: Vec::new(),
            });
        } else if line.starts_with("new subtable ") {
            if let Some(table) = doc.tables.last_mut() {
                table.subtables.push(Subtable {
                    spec: first_quoted(line).to_string(),
                    items: Vec::new(),
                });
            }
        } else if line.starts_with("object category ") {
            if let Some(subtable) = doc.tables.last_mut().and_then(|t| t.subtables.last_mut()) {
                subtable.items.push(line.to_string());
            }
        }
    }

    doc
}

/// Split a leading UTF-8 byte order mark off `text`.
pub(crate) fn split_bom(text: &str) -> (&str, &str) {
    match text.strip_prefix('\u{FEFF}') {
        Some(body) => ("\u{FEFF}", body),
        None => ("", text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
object category "I_Orphan",1,0,0,0,0,0,0,0
new treasuretable "REL_Rare_Rings"
CanMerge 1
new subtable "-1"
object category "I_RingA",1,0,0,0,0,0,0,0
  object category "I_RingB",1,0,0,0,0,0,0,0

new treasuretable "AMP_Para_9"
object category "I_BeforeSubtable",1,0,0,0,0,0,0,0
new subtable "1,1"
object category "I_Para",1,0,0,0,0,0,0,0
new subtable "1,1"
object category "I_Para2",1,0,0,0,0,0,0,0
"#;

    #[test]
    fn test_parse_tables() {
        let doc = parse_treasure(SAMPLE);

        assert_eq!(doc.tables.len(), 2);
        let rings = doc.table("REL_Rare_Rings").unwrap();
        assert_eq!(rings.subtables.len(), 1);
        assert_eq!(rings.subtables[0].spec, "-1");
        assert_eq!(
            rings.items().collect::<Vec<_>>(),
            [
                r#"object category "I_RingA",1,0,0,0,0,0,0,0"#,
                r#"object category "I_RingB",1,0,0,0,0,0,0,0"#,
            ]
        );
    }

    #[test]
    fn test_parse_paragon_subtables() {
        let doc = parse_treasure(SAMPLE);
        let para = doc.table("AMP_Para_9").unwrap();

        assert_eq!(para.subtables_with_spec("1,1").count(), 2);
        assert_eq!(para.items().count(), 2);
        assert!(doc.tables.iter().all(|t| t.items().all(|i| !i.contains("Orphan"))));
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_treasure("").tables.is_empty());
    }

    #[test]
    fn test_parse_with_byte_order_mark() {
        let text = "\u{FEFF}new treasuretable \"REL_Rare_Rings\"\nnew subtable \"-1\"\n";
        let doc = parse_treasure(text);

        assert_eq!(doc.tables.len(), 1);
        assert_eq!(doc.tables[0].name, "REL_Rare_Rings");
    }

}
