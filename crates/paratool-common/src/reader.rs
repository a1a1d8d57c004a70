//! Bounds-checked little-endian reading over a byte slice.

use zerocopy::FromBytes;

use crate::{Error, Result};

/// Forward-only cursor over a borrowed buffer.
///
/// Every read is bounds-checked and reports the offset it failed at, so a
/// truncated package points at the field that ran past the end.
///
/// # Example
///
/// ```
/// use paratool_common::BinaryReader;
///
/// // file list prefix: 3 records, 120 compressed bytes
/// let data = [3, 0, 0, 0, 120, 0, 0, 0];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 3);
/// assert_eq!(reader.read_u32().unwrap(), 120);
/// assert_eq!(reader.remaining(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self::at(data, 0)
    }

    /// Start reading at `offset`.
    #[inline]
    pub const fn at(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            position: offset,
        }
    }

    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Borrow the next `count` bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if available < count {
            return Err(Error::Truncated {
                offset: self.position,
                needed: count,
                available,
            });
        }
        let bytes = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_array::<4>()?;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Copy a fixed-layout struct out of the buffer.
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let offset = self.position;
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::Truncated {
            offset,
            needed: size,
            available: bytes.len(),
        })
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }
}

/// Decode the NUL-terminated UTF-8 prefix of a fixed-size field.
///
/// A field without a terminator is decoded in full.
pub fn str_in_buffer(bytes: &[u8]) -> Result<&str> {
    let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
    Ok(std::str::from_utf8(&bytes[..end])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_at_offset() {
        let data = [0xFF, 0xFF, 0x2A, 0x00, 0x00, 0x00, 0x01, 0x00];
        let mut reader = BinaryReader::at(&data, 2);

        assert_eq!(reader.read_u32().unwrap(), 42);
        assert_eq!(reader.read_bytes(2).unwrap(), &[0x01, 0x00]);
        assert_eq!(reader.position(), data.len());
    }

    #[test]
    fn test_truncated_read_reports_offset() {
        let mut reader = BinaryReader::new(&[1, 2, 3, 4, 5, 6]);
        reader.read_u32().unwrap();

        match reader.read_u32() {
            Err(Error::Truncated {
                offset,
                needed,
                available,
            }) => assert_eq!((offset, needed, available), (4, 4, 2)),
            other => panic!("unexpected result: {other:?}"),
        }
        // a failed read does not move the cursor
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_offset_past_end() {
        let mut reader = BinaryReader::at(&[0u8; 4], 10);
        assert_eq!(reader.remaining(), 0);
        assert!(reader.read_bytes(1).is_err());
    }

    #[test]
    fn test_str_in_buffer() {
        let mut field = [0u8; 16];
        field[..9].copy_from_slice(b"meta.lsx\0");
        field[9] = b'X';

        assert_eq!(str_in_buffer(&field).unwrap(), "meta.lsx");
        assert_eq!(str_in_buffer(b"abcd").unwrap(), "abcd");
        assert!(matches!(str_in_buffer(&[0xC3, 0x28]), Err(Error::Utf8(_))));
    }
}
