//! LSPK package writer.

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use paratool_common::checksum::{ContentDigest, DIGEST_SIZE};
use paratool_common::IntoBytes;
use tracing::debug;
use walkdir::WalkDir;

use crate::codec::{Codec, CompressionMethod, Lz4};
use crate::header::LspkHeader;
use crate::record::FileRecord;
use crate::{Error, Result};

/// File regions are aligned to this many bytes.
const ALIGNMENT: u64 = 8;

/// Filler byte between file regions.
const PADDING_BYTE: u8 = 0xAD;

/// Header settings for new packages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterOptions {
    /// Package flags
    pub flags: u8,
    /// Load priority
    pub priority: u8,
}

/// Outcome of a pack operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    /// Number of files packed
    pub file_count: usize,
    /// Total package size in bytes
    pub package_size: u64,
    /// Digest stored in the header
    pub md5: [u8; DIGEST_SIZE],
}

/// Builds a package from a directory tree.
///
/// Files are stored in ordinal order of their `/`-separated relative paths,
/// so the same tree always produces the same bytes.
#[derive(Debug, Clone, Default)]
pub struct ArchiveWriter {
    options: WriterOptions,
}

impl ArchiveWriter {
    /// Create a writer with the given header settings.
    pub fn new(options: WriterOptions) -> Self {
        Self { options }
    }

    /// Pack `input` into a file at `output`.
    pub fn write_to_path<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<WriteSummary> {
        let file = File::create(output.as_ref())?;
        let mut writer = BufWriter::new(file);
        let summary = self.write_dir(input, &mut writer)?;
        writer.flush()?;
        Ok(summary)
    }

    /// Pack `input` into memory.
    pub fn to_bytes<P: AsRef<Path>>(&self, input: P) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_dir(input, &mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Pack `input` into `out`.
    ///
    /// The header is written last, once the file list offset and the
    /// digest of the data region are known.
    pub fn write_dir<P: AsRef<Path>, W: Write + Seek>(
        &self,
        input: P,
        mut out: W,
    ) -> Result<WriteSummary> {
        let files = collect_files(input.as_ref())?;

        out.write_all(&[0u8; LspkHeader::SIZE])?;
        let mut position = LspkHeader::SIZE as u64;
        let mut digest = ContentDigest::new();
        let mut raw_records = Vec::with_capacity(files.len());

        for (relative, full) in &files {
            let content = fs::read(full)?;
            let compressed = Lz4.compress(&content)?;

            let (stored, method) = if compressed.len() < content.len() {
                (compressed.as_slice(), CompressionMethod::Lz4)
            } else {
                (content.as_slice(), CompressionMethod::None)
            };

            let record = FileRecord {
                path: relative.clone(),
                offset: position,
                archive_part: 0,
                flags: method as u8,
                disk_size: size_field("disk size", stored.len())?,
                uncompressed_size: size_field("uncompressed size", content.len())?,
            };
            raw_records.push(record.to_raw()?);

            out.write_all(stored)?;
            digest.update(stored);
            position += stored.len() as u64;

            let padding = padding_for(position);
            if padding > 0 {
                let filler = vec![PADDING_BYTE; padding as usize];
                out.write_all(&filler)?;
                digest.update(&filler);
                position += padding;
            }
        }

        let table: Vec<u8> = raw_records
            .iter()
            .flat_map(|raw| raw.as_bytes().iter().copied())
            .collect();
        let compressed_table = Lz4.compress(&table)?;
        let compressed_size = size_field("file list size", compressed_table.len())?;

        out.write_u32::<LittleEndian>(size_field("file count", raw_records.len())?)?;
        out.write_u32::<LittleEndian>(compressed_size)?;
        out.write_all(&compressed_table)?;

        let mut header = LspkHeader::new(self.options.flags, self.options.priority);
        header.file_list_offset = position;
        header.file_list_size = 8 + compressed_size;
        header.md5 = digest.finish();

        let package_size = position + 8 + u64::from(compressed_size);
        out.seek(SeekFrom::Start(0))?;
        out.write_all(header.as_bytes())?;
        out.seek(SeekFrom::End(0))?;
        out.flush()?;

        debug!(files = files.len(), bytes = package_size, "packed directory");

        Ok(WriteSummary {
            file_count: files.len(),
            package_size,
            md5: header.md5,
        })
    }
}

/// Collect regular files under `root` as (relative path, full path),
/// sorted by relative path.
fn collect_files(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| Error::NonUtf8Path(entry.path().display().to_string()))?;
        let relative = relative
            .to_str()
            .ok_or_else(|| Error::NonUtf8Path(relative.display().to_string()))?
            .replace('\\', "/");

        files.push((relative, entry.into_path()));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

#[inline]
fn padding_for(position: u64) -> u64 {
    (ALIGNMENT - position % ALIGNMENT) % ALIGNMENT
}

fn size_field(field: &'static str, value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::FieldOverflow {
        field,
        value: value as u64,
    })
}
