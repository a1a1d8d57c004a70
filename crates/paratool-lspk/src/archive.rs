//! LSPK package reader.

use std::fs::{self, File};
use std::ops::Deref;
use std::path::{Component, Path, PathBuf};

use memmap2::Mmap;
use paratool_common::BinaryReader;
use tracing::debug;

use crate::codec::{Codec, Lz4};
use crate::header::LspkHeader;
use crate::record::{FileRecord, RawFileRecord};
use crate::{Error, Result};

/// Backing storage for an opened package.
enum PackageData {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for PackageData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Mapped(mmap) => mmap,
            Self::Owned(bytes) => bytes,
        }
    }
}

/// A read-only LSPK package.
///
/// The header and file list are decoded on open; payloads are decoded on
/// demand from the memory-mapped file.
pub struct LspkArchive {
    data: PackageData,
    name: String,
    header: LspkHeader,
    records: Vec<FileRecord>,
}

impl LspkArchive {
    /// Open a package from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Self::from_data(PackageData::Mapped(mmap), name)
    }

    /// Open a package held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_data(PackageData::Owned(data), "memory".to_string())
    }

    fn from_data(data: PackageData, name: String) -> Result<Self> {
        let header = read_header(&data)?;
        let records = read_file_list(&data, &header)?;
        let priority = header.priority;

        debug!(
            package = %name,
            files = records.len(),
            priority,
            "opened package"
        );

        Ok(Self {
            data,
            name,
            header,
            records,
        })
    }

    /// Get the package name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the decoded header.
    #[inline]
    pub fn header(&self) -> &LspkHeader {
        &self.header
    }

    /// Get the number of file records.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.records.len()
    }

    /// Get all file records in package order.
    #[inline]
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Iterate over file records.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> + '_ {
        self.records.iter()
    }

    /// Find a record by path (case-insensitive, either separator).
    pub fn find(&self, path: &str) -> Option<&FileRecord> {
        let normalized = path.replace('\\', "/");
        self.records
            .iter()
            .find(|r| r.path.replace('\\', "/").eq_ignore_ascii_case(&normalized))
    }

    /// Read and decode the content of a record.
    pub fn read(&self, record: &FileRecord) -> Result<Vec<u8>> {
        extract_file_data(&self.data, record)
    }

    /// Write every file to `output`, recreating the package's directory
    /// structure. Returns the number of files written.
    ///
    /// All paths are validated before anything is written; a path that
    /// would escape `output` fails the whole extraction.
    pub fn extract_all<P: AsRef<Path>>(&self, output: P) -> Result<usize> {
        let output = output.as_ref();
        let targets = self
            .records
            .iter()
            .map(|record| Ok((record, output.join(safe_relative_path(&record.path)?))))
            .collect::<Result<Vec<_>>>()?;

        fs::create_dir_all(output)?;

        let write_one = |(record, target): &(&FileRecord, PathBuf)| -> Result<()> {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(target, self.read(record)?)?;
            Ok(())
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            targets.par_iter().try_for_each(write_one)?;
        }

        #[cfg(not(feature = "parallel"))]
        targets.iter().try_for_each(write_one)?;

        debug!(package = %self.name, files = targets.len(), "extracted package");
        Ok(targets.len())
    }
}

/// Decode and validate the package header.
pub fn read_header(data: &[u8]) -> Result<LspkHeader> {
    let mut reader = BinaryReader::new(data);
    let header: LspkHeader = reader.read_struct()?;

    if header.magic != LspkHeader::MAGIC {
        return Err(Error::InvalidMagic(header.magic));
    }
    let version = header.version;
    if version != LspkHeader::VERSION {
        return Err(Error::UnsupportedVersion {
            expected: LspkHeader::VERSION,
            actual: version,
        });
    }

    Ok(header)
}

/// Decode the file list the header points at.
///
/// The block holds a `u32` record count and a `u32` compressed size,
/// followed by an LZ4 block that must expand to exactly
/// `count * 272` bytes. Counts the block could never hold are rejected
/// before the table is allocated.
pub fn read_file_list(data: &[u8], header: &LspkHeader) -> Result<Vec<FileRecord>> {
    let offset = header.file_list_offset;
    let start = usize::try_from(offset)
        .ok()
        .filter(|&start| start <= data.len())
        .ok_or(Error::OutOfBounds {
            offset,
            length: u64::from(header.file_list_size),
            size: data.len(),
        })?;

    let mut reader = BinaryReader::at(data, start);
    let count = reader.read_u32()? as usize;
    let compressed_size = reader.read_u32()? as usize;
    let compressed = reader.read_bytes(compressed_size)?;

    let table_size = count
        .checked_mul(RawFileRecord::SIZE)
        .ok_or(Error::FieldOverflow {
            field: "file count",
            value: count as u64,
        })?;
    let table = Lz4.decompress(compressed, table_size)?;

    let mut records = BinaryReader::new(&table);
    (0..count)
        .map(|_| FileRecord::from_raw(&records.read_struct::<RawFileRecord>()?))
        .collect()
}

/// Read the stored bytes of `record` from `data` and decode them.
pub fn extract_file_data(data: &[u8], record: &FileRecord) -> Result<Vec<u8>> {
    if record.archive_part != 0 {
        return Err(Error::MultiPart(record.archive_part));
    }

    let method = record.compression()?;
    let length = u64::from(record.disk_size);
    let out_of_bounds = || Error::OutOfBounds {
        offset: record.offset,
        length,
        size: data.len(),
    };

    let end = record.offset.checked_add(length).ok_or_else(out_of_bounds)?;
    if end > data.len() as u64 {
        return Err(out_of_bounds());
    }
    let stored = &data[record.offset as usize..end as usize];

    method
        .codec()
        .decompress(stored, record.uncompressed_size as usize)
}

/// Turn a package path into a relative filesystem path, rejecting anything
/// that could land outside the extraction root.
fn safe_relative_path(path: &str) -> Result<PathBuf> {
    let normalized = path.replace('\\', "/");
    let unsafe_path = || Error::UnsafePath(path.to_string());

    if normalized.starts_with('/') || normalized.contains(':') {
        return Err(unsafe_path());
    }

    let mut relative = PathBuf::new();
    for segment in normalized.split('/') {
        match Path::new(segment).components().next() {
            None | Some(Component::CurDir) => {}
            Some(Component::Normal(part)) => relative.push(part),
            Some(_) => return Err(unsafe_path()),
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(unsafe_path());
    }
    Ok(relative)
}
