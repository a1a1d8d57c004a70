//! Common utilities for ParaTool.
//!
//! This crate provides foundational types and utilities used across all ParaTool crates:
//!
//! - [`BinaryReader`] - Zero-copy little-endian reading from byte slices
//! - [`checksum`] - MD5 content digests for package manifests
//! - [`text`] - Quoted-field extraction shared by the line-oriented text formats

mod error;
mod reader;

pub mod checksum;
pub mod text;

pub use error::{Error, Result};
pub use reader::{str_in_buffer, BinaryReader};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
