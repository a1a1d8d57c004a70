//! MD5 content digests.
//!
//! LSPK packages carry a 16-byte MD5 of their file-data region in the header.
//! The digest is written as a manifest field and is never checked on read.

use md5::{Digest, Md5};

/// Size of a content digest in bytes.
pub const DIGEST_SIZE: usize = 16;

/// Incremental MD5 digest over a stream of written chunks.
#[derive(Debug, Clone, Default)]
pub struct ContentDigest {
    hasher: Md5,
}

impl ContentDigest {
    /// Create an empty digest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed more bytes into the digest.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Consume the digest and return the 16-byte hash.
    pub fn finish(self) -> [u8; DIGEST_SIZE] {
        let mut out = [0u8; DIGEST_SIZE];
        out.copy_from_slice(&self.hasher.finalize());
        out
    }
}

/// Compute the MD5 digest of a byte slice.
#[inline]
pub fn digest(data: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut content = ContentDigest::new();
    content.update(data);
    content.finish()
}

/// Format a digest as lowercase hex.
pub fn to_hex(digest: &[u8; DIGEST_SIZE]) -> String {
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
