//! Chunked content fingerprints.
//!
//! The remote store labels every object with an ETag. For objects uploaded
//! in one piece the ETag is the MD5 of the content; for multipart uploads
//! it is the MD5 of the concatenated raw part digests followed by the part
//! count. Reproducing that scheme locally lets a sync compare fingerprints
//! without downloading anything:
//!
//! ```text
//! 1 chunk:   "<hex md5(content)>"
//! N chunks:  "<hex md5(md5(c1) ‖ md5(c2) ‖ … ‖ md5(cN))>-N"
//! ```
//!
//! The chunk size must equal the part size used for the upload, otherwise
//! every comparison fails and every file is re-uploaded.

use md5::{Digest, Md5};
use std::io::Read;
use sync_types::Fingerprint;
use thiserror::Error;

/// Default chunk size: 8 MiB, the multipart threshold and part size.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Read buffer used when hashing from a reader.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Errors produced while fingerprinting content.
#[derive(Debug, Error)]
pub enum HashError {
    /// A chunk size of zero was requested.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    /// Reading the content failed.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Streaming hasher producing provider-compatible fingerprints.
///
/// Chunk boundaries fall at fixed offsets (multiples of the chunk size)
/// no matter how the bytes are split across `update` calls.
#[derive(Clone)]
pub struct ChunkedHasher {
    chunk_size: usize,
    current: Md5,
    current_len: usize,
    part_digests: Vec<[u8; 16]>,
}

impl ChunkedHasher {
    /// Create a hasher with the given chunk size in bytes.
    pub fn new(chunk_size: usize) -> Result<Self, HashError> {
        if chunk_size == 0 {
            return Err(HashError::InvalidChunkSize);
        }
        Ok(Self {
            chunk_size,
            current: Md5::new(),
            current_len: 0,
            part_digests: Vec::new(),
        })
    }

    /// The configured chunk size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Feed more content.
    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let room = self.chunk_size - self.current_len;
            let take = room.min(data.len());
            self.current.update(&data[..take]);
            self.current_len += take;
            data = &data[take..];

            if self.current_len == self.chunk_size {
                self.part_digests.push(self.current.finalize_reset().into());
                self.current_len = 0;
            }
        }
    }

    /// Number of chunks seen so far, including a partial trailing chunk.
    pub fn chunk_count(&self) -> usize {
        self.part_digests.len() + usize::from(self.current_len > 0)
    }

    /// Finish hashing.
    ///
    /// Returns `None` when no bytes were fed: empty content has no
    /// fingerprint of its own.
    pub fn finalize(mut self) -> Option<Fingerprint> {
        if self.current_len > 0 {
            self.part_digests.push(self.current.finalize_reset().into());
        }

        match self.part_digests.as_slice() {
            [] => None,
            [single] => Some(Fingerprint::single(single)),
            parts => {
                let mut outer = Md5::new();
                for digest in parts {
                    outer.update(digest);
                }
                let digest: [u8; 16] = outer.finalize().into();
                Some(Fingerprint::multipart(&digest, parts.len()))
            }
        }
    }
}

/// Fingerprint everything a reader yields.
pub fn fingerprint_reader<R: Read>(
    mut reader: R,
    chunk_size: usize,
) -> Result<Option<Fingerprint>, HashError> {
    let mut hasher = ChunkedHasher::new(chunk_size)?;
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

/// Fingerprint an in-memory buffer.
pub fn fingerprint_bytes(data: &[u8], chunk_size: usize) -> Result<Option<Fingerprint>, HashError> {
    let mut hasher = ChunkedHasher::new(chunk_size)?;
    hasher.update(data);
    Ok(hasher.finalize())
}
