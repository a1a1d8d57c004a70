//! Positional insertion into treasure table text.
//!
//! All edits are planned against one immutable snapshot of the document's
//! lines and then applied bottom-up, so earlier anchors stay valid. Lines are
//! split on `\n` only; `\r` and every untouched byte survive as-is.

use std::collections::{HashMap, HashSet};

use paratool_common::text::closed_quoted;
use paratool_stats::ItemEntry;
use tracing::debug;

use crate::document::split_bom;
use crate::targets::{TableAdditions, PARAGON_SPEC, PICK_ALL_SPEC};

/// Lines to insert directly after line `after` of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub after: usize,
    pub lines: Vec<String>,
    /// Number of reference lines among `lines`
    pub references: usize,
}

/// Result of patching a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreasurePatch {
    pub text: String,
    /// Reference lines added across all tables
    pub references_added: usize,
}

/// Inclusive line range of one table.
#[derive(Debug, Clone, Copy)]
struct TableRange {
    start: usize,
    end: usize,
}

/// Insert references for every enabled item into `text`.
///
/// Missing target tables are skipped. A leading byte order mark is kept in
/// the output. Re-applying the same items to the output changes nothing.
pub fn patch_treasure<'a, I>(text: &str, items: I) -> TreasurePatch
where
    I: IntoIterator<Item = &'a ItemEntry>,
{
    let (bom, body) = split_bom(text);
    let additions = TableAdditions::for_items(items);
    let lines: Vec<&str> = body.split('\n').collect();
    let insertions = plan_insertions(&lines, &additions);
    let references_added = insertions.iter().map(|i| i.references).sum();

    TreasurePatch {
        text: format!("{bom}{}", apply_insertions(&lines, insertions)),
        references_added,
    }
}

/// Plan insertions for `additions` against a line snapshot.
pub fn plan_insertions(lines: &[&str], additions: &TableAdditions) -> Vec<Insertion> {
    let tables = index_tables(lines);
    let mut insertions = Vec::new();

    for (name, new_lines) in &additions.pick_all {
        let Some(&range) = tables.get(name.as_str()) else {
            continue;
        };
        let Some(anchor) = last_reference_in_subtable(lines, range, PICK_ALL_SPEC) else {
            debug!(table = %name, "no pick-all subtable, skipping");
            continue;
        };

        let fresh = missing_references(lines, range, new_lines);
        if fresh.is_empty() {
            continue;
        }

        debug!(table = %name, added = fresh.len(), "extending pool table");
        insertions.push(Insertion {
            after: anchor,
            references: fresh.len(),
            lines: fresh,
        });
    }

    for (name, new_lines) in &additions.paragon {
        let Some(&range) = tables.get(name.as_str()) else {
            continue;
        };

        let fresh = missing_references(lines, range, new_lines);
        if fresh.is_empty() {
            continue;
        }

        let mut anchor = range.end;
        while anchor > range.start && lines[anchor].trim().is_empty() {
            anchor -= 1;
        }

        debug!(table = %name, added = fresh.len(), "appending paragon blocks");
        let references = fresh.len();
        let block = fresh
            .into_iter()
            .flat_map(|line| [format!("new subtable \"{PARAGON_SPEC}\""), line])
            .collect();
        insertions.push(Insertion {
            after: anchor,
            lines: block,
            references,
        });
    }

    insertions
}

fn apply_insertions(lines: &[&str], mut insertions: Vec<Insertion>) -> String {
    let mut out: Vec<String> = lines.iter().map(|line| line.to_string()).collect();

    insertions.sort_by(|a, b| b.after.cmp(&a.after));
    for insertion in insertions {
        let at = insertion.after + 1;
        out.splice(at..at, insertion.lines);
    }

    out.join("\n")
}

/// Map table names to their line ranges. A table runs until the line before
/// the next table header; on duplicate names the last table wins.
fn index_tables<'a>(lines: &[&'a str]) -> HashMap<&'a str, TableRange> {
    let starts: Vec<(&str, usize)> = lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| {
            let trimmed = line.trim_start();
            if !trimmed.starts_with("new treasuretable \"") {
                return None;
            }
            closed_quoted(trimmed)
                .filter(|name| !name.is_empty())
                .map(|name| (name, index))
        })
        .collect();

    let mut tables = HashMap::with_capacity(starts.len());
    for (i, &(name, start)) in starts.iter().enumerate() {
        let end = starts
            .get(i + 1)
            .map_or(lines.len() - 1, |&(_, next)| next - 1);
        tables.insert(name, TableRange { start, end });
    }
    tables
}

fn last_reference_in_subtable(lines: &[&str], range: TableRange, spec: &str) -> Option<usize> {
    let mut in_target = false;
    let mut last = None;

    for (index, line) in lines
        .iter()
        .enumerate()
        .take(range.end + 1)
        .skip(range.start)
    {
        let trimmed = line.trim_start();
        if trimmed.starts_with("new subtable ") {
            in_target = closed_quoted(trimmed) == Some(spec);
        }
        if in_target && trimmed.starts_with("object category ") {
            last = Some(index);
        }
    }

    last
}

/// Lines of `candidates` not already referenced anywhere in the table.
fn missing_references(lines: &[&str], range: TableRange, candidates: &[String]) -> Vec<String> {
    let existing: HashSet<&str> = lines[range.start..=range.end]
        .iter()
        .map(|line| line.trim())
        .filter(|line| line.starts_with("object category "))
        .collect();

    candidates
        .iter()
        .filter(|line| !existing.contains(line.as_str()))
        .cloned()
        .collect()
}
