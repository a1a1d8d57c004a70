//! Package header.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// LSPK package header.
///
/// Sits at offset 0 of the package and points at the compressed file list
/// stored after the last file region.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct LspkHeader {
    /// Magic bytes ("LSPK")
    pub magic: [u8; 4],
    /// Format revision
    pub version: u32,
    /// Absolute offset of the file list block
    pub file_list_offset: u64,
    /// Size of the file list block, including its 8-byte prefix
    pub file_list_size: u32,
    /// Package flags
    pub flags: u8,
    /// Load priority
    pub priority: u8,
    /// MD5 of the data region between the header and the file list
    pub md5: [u8; 16],
    /// Number of package parts
    pub num_parts: u16,
}

impl LspkHeader {
    /// Header magic bytes.
    pub const MAGIC: [u8; 4] = *b"LSPK";

    /// The only supported format revision.
    pub const VERSION: u32 = 18;

    /// On-disk size of the header.
    pub const SIZE: usize = 40;

    /// Create a header for a single-part package.
    pub fn new(flags: u8, priority: u8) -> Self {
        Self {
            magic: Self::MAGIC,
            version: Self::VERSION,
            file_list_offset: 0,
            file_list_size: 0,
            flags,
            priority,
            md5: [0; 16],
            num_parts: 1,
        }
    }
}

const _: () = assert!(std::mem::size_of::<LspkHeader>() == LspkHeader::SIZE);
