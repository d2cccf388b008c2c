//! Remote object-store trait.
//!
//! The sync engine only needs four capabilities from a store: paginated
//! listing, whole-object upload, idempotent container creation, and
//! container enumeration. Everything provider-specific lives behind this
//! trait.

use std::path::PathBuf;

use async_trait::async_trait;
use sync_types::{ContainerName, CreateOutcome, Fingerprint, ObjectKey};

use crate::error::StoreError;

/// Default number of objects per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// One object as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    /// Key exactly as the store reports it. May not be a valid
    /// [`ObjectKey`] (e.g. folder markers ending in `/`).
    pub key: String,
    /// Store-side fingerprint (ETag).
    pub fingerprint: Fingerprint,
}

/// One page of a container listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Objects on this page, in key order.
    pub objects: Vec<RemoteObject>,
    /// Token for the next page, `None` when the listing is complete.
    pub next_continuation: Option<String>,
}

/// Upload of a single local file.
#[derive(Debug, Clone)]
pub struct PutRequest {
    /// Target container.
    pub container: ContainerName,
    /// Target key.
    pub key: ObjectKey,
    /// Local file providing the bytes.
    pub source: PathBuf,
    /// Media type recorded on the object.
    pub content_type: String,
    /// Multipart threshold and part size in bytes.
    pub chunk_size: usize,
}

/// What the store recorded for an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutReceipt {
    /// Fingerprint the store assigned.
    pub fingerprint: Fingerprint,
    /// Object size in bytes.
    pub size: u64,
    /// Number of parts transferred.
    pub parts: usize,
}

/// Trait for remote object stores.
///
/// Implementations must fingerprint uploads with the chunked scheme from
/// `sync_core::hasher`, using the request's `chunk_size` and uploading as a
/// single part when the content fits in one chunk, so a later listing
/// compares equal to a local fingerprint.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one page of `container`'s listing.
    ///
    /// `continuation` is `None` for the first page and otherwise the
    /// `next_continuation` of the previous page.
    async fn list_page(
        &self,
        container: &ContainerName,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError>;

    /// Upload a local file, replacing any existing object at the key.
    async fn put(&self, request: &PutRequest) -> Result<PutReceipt, StoreError>;

    /// Create a container, reporting whether it already existed.
    async fn create_container(&self, container: &ContainerName)
        -> Result<CreateOutcome, StoreError>;

    /// Containers owned by the caller, sorted by name.
    async fn list_containers(&self) -> Result<Vec<ContainerName>, StoreError>;
}

/// Number of parts a chunked upload of `size` bytes uses.
pub(crate) fn part_count(size: u64, chunk_size: usize) -> usize {
    if size == 0 {
        return 1;
    }
    let chunk = chunk_size.max(1) as u64;
    size.div_ceil(chunk) as usize
}
