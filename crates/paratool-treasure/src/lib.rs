//! Treasure table support.
//!
//! Treasure tables are plain text:
//!
//! ```text
//! new treasuretable "REL_Rare_Rings"
//! new subtable "-1"
//! object category "I_MAG_Ring_Example",1,0,0,0,0,0,0,0
//! ```
//!
//! [`parse_treasure`] builds a read-only model of a document.
//! [`patch_treasure`] inserts item references into the pick-all pool tables
//! and the paragon single-pick tables, touching nothing else.

mod document;
mod patch;
mod targets;

pub use document::{parse_treasure, Subtable, TreasureDocument, TreasureTable};
pub use patch::{patch_treasure, plan_insertions, Insertion, TreasurePatch};
pub use targets::{
    paragon_pool_number, paragon_theme_number, reference_line, TableAdditions, PARAGON_SPEC,
    PICK_ALL_SPEC,
};
