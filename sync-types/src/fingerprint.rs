//! Content fingerprints compatible with the provider's ETag format.

use serde::{Deserialize, Serialize};
use std::fmt;

/// MD5 of zero bytes, as the provider reports it for empty objects.
const EMPTY_OBJECT_ETAG: &str = "\"d41d8cd98f00b204e9800998ecf8427e\"";

/// An opaque content fingerprint, compared for equality only.
///
/// Formatted exactly like the provider's displayed ETag, including the
/// surrounding double quotes:
///
/// ```text
/// "9e107d9d372bb6826bd81d3542a419d6"      single chunk
/// "d4ab2f8e8f3c09f1c27d2b0b5de8e5cb-3"    three chunks
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint for content that fit in a single chunk.
    pub fn single(digest: &[u8; 16]) -> Self {
        Self(format!("\"{}\"", hex::encode(digest)))
    }

    /// Fingerprint for content hashed as `parts` chunks.
    ///
    /// `digest` is the hash of the concatenated raw chunk digests.
    pub fn multipart(digest: &[u8; 16], parts: usize) -> Self {
        Self(format!("\"{}-{}\"", hex::encode(digest), parts))
    }

    /// Wrap a fingerprint reported by a remote store.
    ///
    /// Values without surrounding double quotes are quoted; anything else
    /// is kept verbatim.
    pub fn from_remote(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            Self(value)
        } else {
            Self(format!("\"{value}\""))
        }
    }

    /// The fingerprint the provider reports for a zero-byte object.
    pub fn empty_object() -> Self {
        Self(EMPTY_OBJECT_ETAG.to_string())
    }

    /// The fingerprint as a string slice, quotes included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of chunks for a multipart fingerprint, `None` otherwise.
    pub fn part_count(&self) -> Option<usize> {
        let inner = self.0.trim_matches('"');
        let (_, parts) = inner.rsplit_once('-')?;
        parts.parse().ok()
    }

    /// True for the `"<hex>-<N>"` form.
    pub fn is_multipart(&self) -> bool {
        self.part_count().is_some()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.0)
    }
}
