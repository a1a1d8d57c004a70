//! Stat data model for item mods.
//!
//! - [`parse_stats`] reads the line-oriented stat entry format
//! - [`StatsResolver`] follows `using` chains to resolve inherited properties
//! - [`detect_pool`] and [`Rarity`] classify items into loot pools and tiers
//! - [`pricing`] maps a pool and tier to a gold value
//! - [`generate_overrides`] renders the value-override stat file
//! - [`BaseStats`] holds the base-game catalog every mod is layered over

mod base;
mod classify;
mod entry;
mod error;
mod item;
mod overrides;
mod parser;
mod resolver;

pub mod pricing;

pub use base::BaseStats;
pub use classify::{detect_pool, ItemKind, Pool, Rarity};
pub use entry::{PropertyMap, StatsEntry};
pub use error::{Error, Result};
pub use item::{ItemEntry, ModDescriptor, ResolvedProperties};
pub use overrides::{generate_overrides, OVERRIDES_FILE_NAME};
pub use parser::{parse_stats, parse_stats_bytes};
pub use pricing::SlotCategory;
pub use resolver::{StatsResolver, MAX_INHERITANCE_DEPTH};
