//! LSPK package reader and writer.
//!
//! LSPK is the container format used for game content packages. This crate
//! supports exactly one revision of it, version 18:
//!
//! - 40-byte header with a 64-bit offset to the file list
//! - LZ4-compressed table of fixed 272-byte file records
//! - Per-file payloads stored raw, zlib-compressed, or LZ4-block-compressed
//! - File regions padded to 8-byte alignment
//!
//! Multi-part packages are not supported.
//!
//! # Example
//!
//! ```no_run
//! use paratool_lspk::LspkArchive;
//!
//! let archive = LspkArchive::open("MyMod.pak")?;
//!
//! for record in archive.iter() {
//!     println!("{}: {} bytes", record.path, record.uncompressed_size);
//! }
//!
//! if let Some(meta) = archive.find("Mods/MyMod/meta.lsx") {
//!     let data = archive.read(meta)?;
//! }
//! # Ok::<(), paratool_lspk::Error>(())
//! ```

mod archive;
mod error;
mod header;
mod record;
mod writer;

pub mod codec;

pub use archive::{extract_file_data, read_file_list, read_header, LspkArchive};
pub use codec::{Codec, CompressionMethod};
pub use error::{Error, Result};
pub use header::LspkHeader;
pub use record::{FileRecord, RawFileRecord};
pub use writer::{ArchiveWriter, WriteSummary, WriterOptions};
