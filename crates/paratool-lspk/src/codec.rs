//! Payload compression.
//!
//! Each [`CompressionMethod`] has a matching [`Codec`]. All decoders check
//! the produced length against the size recorded in the package.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::{Error, Result};

/// Compression method stored in the low nibble of a record's flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompressionMethod {
    /// No compression (stored).
    None = 0,
    /// zlib stream.
    Zlib = 1,
    /// LZ4 block without a size prefix.
    Lz4 = 2,
}

impl TryFrom<u8> for CompressionMethod {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Zlib),
            2 => Ok(Self::Lz4),
            other => Err(other),
        }
    }
}

impl CompressionMethod {
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Zlib => "zlib",
            Self::Lz4 => "lz4",
        }
    }

    /// Codec implementing this method.
    pub fn codec(self) -> &'static dyn Codec {
        match self {
            Self::None => &Store,
            Self::Zlib => &Zlib,
            Self::Lz4 => &Lz4,
        }
    }
}

/// Compressor/decompressor for one method.
pub trait Codec: Send + Sync {
    /// Method identifier written to file records.
    fn method(&self) -> CompressionMethod;

    /// Compress a payload.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress a payload that must expand to exactly `expected_size` bytes.
    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>>;
}

/// Identity codec.
pub struct Store;

impl Codec for Store {
    fn method(&self) -> CompressionMethod {
        CompressionMethod::None
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
        check_size("stored payload", expected_size, data.len())?;
        Ok(data.to_vec())
    }
}

/// zlib codec.
pub struct Zlib;

impl Codec for Zlib {
    fn method(&self) -> CompressionMethod {
        CompressionMethod::Zlib
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
        check_expansion("zlib payload", expected_size, data.len(), ZLIB_MAX_RATIO)?;

        let mut output = Vec::with_capacity(expected_size);
        ZlibDecoder::new(data)
            .take(expected_size as u64 + 1)
            .read_to_end(&mut output)
            .map_err(|e| Error::Decompression(e.to_string()))?;

        check_size("zlib payload", expected_size, output.len())?;
        Ok(output)
    }
}

/// LZ4 block codec.
pub struct Lz4;

impl Codec for Lz4 {
    fn method(&self) -> CompressionMethod {
        CompressionMethod::Lz4
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(lz4_flex::block::compress(data))
    }

    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
        check_expansion("lz4 payload", expected_size, data.len(), LZ4_MAX_RATIO)?;

        let output = lz4_flex::block::decompress(data, expected_size)
            .map_err(|e| Error::Decompression(e.to_string()))?;

        check_size("lz4 payload", expected_size, output.len())?;
        Ok(output)
    }
}

/// Upper bound on the LZ4 block expansion ratio.
const LZ4_MAX_RATIO: usize = 255;

/// Upper bound on the deflate expansion ratio.
const ZLIB_MAX_RATIO: usize = 1032;

/// Reject declared sizes that `stored` bytes can never expand to, before
/// anything is allocated for them.
fn check_expansion(
    context: &'static str,
    declared: usize,
    stored: usize,
    ratio: usize,
) -> Result<()> {
    let limit = stored.saturating_mul(ratio).saturating_add(16);
    if declared > limit {
        return Err(Error::ImplausibleSize {
            context,
            declared: declared as u64,
            stored,
        });
    }
    Ok(())
}

fn check_size(context: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::SizeMismatch {
            context,
            expected,
            actual,
        });
    }
    Ok(())
}
