//! File records.

use paratool_common::str_in_buffer;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::codec::CompressionMethod;
use crate::{Error, Result};

/// Size of the fixed path field.
pub const PATH_FIELD_SIZE: usize = 256;

/// On-disk file record, exactly as stored in the decoded file list.
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct RawFileRecord {
    /// NUL-terminated UTF-8 path
    pub path: [u8; PATH_FIELD_SIZE],
    /// Low 32 bits of the data offset
    pub offset_lo: u32,
    /// High 16 bits of the data offset
    pub offset_hi: u16,
    /// Package part holding the data
    pub archive_part: u8,
    /// Compression method in the low nibble
    pub flags: u8,
    /// Stored size of the data
    pub disk_size: u32,
    /// Size after decompression
    pub uncompressed_size: u32,
}

impl RawFileRecord {
    /// On-disk size of a record.
    pub const SIZE: usize = 272;
}

const _: () = assert!(std::mem::size_of::<RawFileRecord>() == RawFileRecord::SIZE);

/// A decoded file record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path inside the package, `/`-separated
    pub path: String,
    /// Absolute data offset (48-bit on disk)
    pub offset: u64,
    /// Package part holding the data
    pub archive_part: u8,
    /// Raw flags byte
    pub flags: u8,
    /// Stored size of the data
    pub disk_size: u32,
    /// Size after decompression
    pub uncompressed_size: u32,
}

impl FileRecord {
    /// Largest offset representable in a record.
    pub const MAX_OFFSET: u64 = (1 << 48) - 1;

    /// Compression method encoded in the low nibble of the flags.
    pub fn compression(&self) -> Result<CompressionMethod> {
        CompressionMethod::try_from(self.flags & 0x0F).map_err(Error::UnsupportedCompression)
    }

    /// Whether the stored bytes differ from the content.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.flags & 0x0F != 0
    }

    /// Decode a record from its on-disk form.
    pub fn from_raw(raw: &RawFileRecord) -> Result<Self> {
        let path_field = raw.path;
        let path = str_in_buffer(&path_field)?.to_string();

        Ok(Self {
            path,
            offset: u64::from(raw.offset_lo) | (u64::from(raw.offset_hi) << 32),
            archive_part: raw.archive_part,
            flags: raw.flags,
            disk_size: raw.disk_size,
            uncompressed_size: raw.uncompressed_size,
        })
    }

    /// Encode the record into its on-disk form.
    pub fn to_raw(&self) -> Result<RawFileRecord> {
        let bytes = self.path.as_bytes();
        // One byte is reserved for the terminator.
        if bytes.len() >= PATH_FIELD_SIZE {
            return Err(Error::PathTooLong {
                path: self.path.clone(),
                len: bytes.len(),
                max: PATH_FIELD_SIZE - 1,
            });
        }
        if self.offset > Self::MAX_OFFSET {
            return Err(Error::FieldOverflow {
                field: "file offset",
                value: self.offset,
            });
        }

        let mut path = [0u8; PATH_FIELD_SIZE];
        path[..bytes.len()].copy_from_slice(bytes);

        Ok(RawFileRecord {
            path,
            offset_lo: (self.offset & 0xFFFF_FFFF) as u32,
            offset_hi: (self.offset >> 32) as u16,
            archive_part: self.archive_part,
            flags: self.flags,
            disk_size: self.disk_size,
            uncompressed_size: self.uncompressed_size,
        })
    }
}
