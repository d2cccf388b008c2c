//! In-memory object store for testing.
//!
//! Behaves like a real store (pagination, ownership, chunked fingerprints)
//! and adds failure injection and counters for verifying sync behavior.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use sync_core::fingerprint_bytes;
use sync_types::{ContainerName, CreateOutcome, Fingerprint, ObjectKey};

use crate::error::StoreError;
use crate::store::{
    part_count, ListPage, ObjectStore, PutReceipt, PutRequest, RemoteObject, DEFAULT_PAGE_SIZE,
};

/// An object held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object bytes.
    pub data: Vec<u8>,
    /// Media type recorded at upload.
    pub content_type: String,
    /// Store-side fingerprint.
    pub fingerprint: Fingerprint,
}

/// In-memory object store.
///
/// Cloning shares the underlying state, so a test can keep a handle
/// while the sync executor owns another.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    containers: BTreeMap<ContainerName, MemoryContainer>,
    page_size: Option<usize>,
    put_log: Vec<ObjectKey>,
    list_calls: usize,
    fail_lists: u32,
    fail_puts: u32,
    rejected_keys: HashMap<ObjectKey, String>,
    denied: HashSet<ContainerName>,
}

#[derive(Debug, Default)]
struct MemoryContainer {
    owned: bool,
    objects: BTreeMap<ObjectKey, StoredObject>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of objects returned per listing page.
    pub fn with_page_size(self, page_size: usize) -> Self {
        self.lock().page_size = Some(page_size.max(1));
        self
    }

    /// Create an owned container directly.
    pub fn with_container(self, container: &ContainerName) -> Self {
        self.lock()
            .containers
            .entry(container.clone())
            .or_default()
            .owned = true;
        self
    }

    /// Register a container that exists but belongs to someone else.
    pub fn add_foreign_container(&self, container: &ContainerName) {
        self.lock()
            .containers
            .entry(container.clone())
            .or_default()
            .owned = false;
    }

    /// Make every request against `container` fail with `AccessDenied`.
    pub fn deny_access(&self, container: &ContainerName) {
        self.lock().denied.insert(container.clone());
    }

    /// Fail the next `count` listing calls with a transient error.
    pub fn fail_next_lists(&self, count: u32) {
        self.lock().fail_lists = count;
    }

    /// Fail the next `count` uploads with a transient error.
    pub fn fail_next_puts(&self, count: u32) {
        self.lock().fail_puts = count;
    }

    /// Permanently reject uploads to `key`.
    pub fn reject_key(&self, key: &ObjectKey, reason: &str) {
        self.lock()
            .rejected_keys
            .insert(key.clone(), reason.to_string());
    }

    /// Store bytes directly, fingerprinted with `chunk_size`.
    pub fn insert_object(
        &self,
        container: &ContainerName,
        key: &ObjectKey,
        data: &[u8],
        chunk_size: usize,
    ) {
        let fingerprint = fingerprint_bytes(data, chunk_size)
            .ok()
            .flatten()
            .unwrap_or_else(Fingerprint::empty_object);
        let mut inner = self.lock();
        let entry = inner.containers.entry(container.clone()).or_default();
        entry.owned = true;
        entry.objects.insert(
            key.clone(),
            StoredObject {
                data: data.to_vec(),
                content_type: "application/octet-stream".to_string(),
                fingerprint,
            },
        );
    }

    /// Remove an object, as another writer might.
    pub fn remove_object(&self, container: &ContainerName, key: &ObjectKey) -> bool {
        self.lock()
            .containers
            .get_mut(container)
            .and_then(|c| c.objects.remove(key))
            .is_some()
    }

    /// Get a stored object.
    pub fn object(&self, container: &ContainerName, key: &ObjectKey) -> Option<StoredObject> {
        self.lock()
            .containers
            .get(container)
            .and_then(|c| c.objects.get(key))
            .cloned()
    }

    /// Number of objects in a container.
    pub fn object_count(&self, container: &ContainerName) -> usize {
        self.lock()
            .containers
            .get(container)
            .map_or(0, |c| c.objects.len())
    }

    /// Number of successful uploads so far.
    pub fn put_count(&self) -> usize {
        self.lock().put_log.len()
    }

    /// Keys of successful uploads, in order.
    pub fn uploaded_keys(&self) -> Vec<ObjectKey> {
        self.lock().put_log.clone()
    }

    /// Number of listing calls received, including failed ones.
    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    /// Clear the upload log and call counters.
    pub fn reset_counters(&self) {
        let mut inner = self.lock();
        inner.put_log.clear();
        inner.list_calls = 0;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemoryStoreInner {
    fn owned_container(
        &mut self,
        container: &ContainerName,
    ) -> Result<&mut MemoryContainer, StoreError> {
        if self.denied.contains(container) {
            return Err(StoreError::AccessDenied {
                container: container.to_string(),
            });
        }
        match self.containers.get_mut(container) {
            Some(c) if c.owned => Ok(c),
            Some(_) => Err(StoreError::AccessDenied {
                container: container.to_string(),
            }),
            None => Err(StoreError::ContainerNotFound {
                container: container.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_page(
        &self,
        container: &ContainerName,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let mut inner = self.lock();
        inner.list_calls += 1;

        if inner.fail_lists > 0 {
            inner.fail_lists -= 1;
            return Err(StoreError::Throttled("injected listing failure".into()));
        }

        let page_size = inner.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        let start = match continuation {
            None => Bound::Unbounded,
            Some(token) => Bound::Excluded(ObjectKey::parse(token).map_err(|_| {
                StoreError::InvalidRequest(format!("bad continuation token {token:?}"))
            })?),
        };

        let objects = &inner.owned_container(container)?.objects;
        let mut range = objects.range((start, Bound::Unbounded));
        let page: Vec<RemoteObject> = range
            .by_ref()
            .take(page_size)
            .map(|(key, obj)| RemoteObject {
                key: key.to_string(),
                fingerprint: obj.fingerprint.clone(),
            })
            .collect();
        let has_more = range.next().is_some();

        let next_continuation = if has_more {
            page.last().map(|obj| obj.key.clone())
        } else {
            None
        };

        Ok(ListPage {
            objects: page,
            next_continuation,
        })
    }

    async fn put(&self, request: &PutRequest) -> Result<PutReceipt, StoreError> {
        {
            let mut inner = self.lock();
            if inner.fail_puts > 0 {
                inner.fail_puts -= 1;
                return Err(StoreError::Unavailable("injected upload failure".into()));
            }
            if let Some(reason) = inner.rejected_keys.get(&request.key) {
                return Err(StoreError::Rejected {
                    key: request.key.to_string(),
                    reason: reason.clone(),
                });
            }
            inner.owned_container(&request.container)?;
        }

        let data = tokio::fs::read(&request.source)
            .await
            .map_err(|e| StoreError::SourceRead {
                path: request.source.clone(),
                source: e,
            })?;

        let fingerprint = fingerprint_bytes(&data, request.chunk_size)
            .map_err(|e| StoreError::InvalidRequest(e.to_string()))?
            .unwrap_or_else(Fingerprint::empty_object);
        let receipt = PutReceipt {
            fingerprint: fingerprint.clone(),
            size: data.len() as u64,
            parts: part_count(data.len() as u64, request.chunk_size),
        };

        let mut inner = self.lock();
        inner
            .owned_container(&request.container)?
            .objects
            .insert(
                request.key.clone(),
                StoredObject {
                    data,
                    content_type: request.content_type.clone(),
                    fingerprint,
                },
            );
        inner.put_log.push(request.key.clone());
        Ok(receipt)
    }

    async fn create_container(
        &self,
        container: &ContainerName,
    ) -> Result<CreateOutcome, StoreError> {
        let mut inner = self.lock();
        match inner.containers.get(container) {
            Some(c) if c.owned => Ok(CreateOutcome::AlreadyOwned),
            Some(_) => Ok(CreateOutcome::Denied),
            None => {
                inner.containers.insert(
                    container.clone(),
                    MemoryContainer {
                        owned: true,
                        objects: BTreeMap::new(),
                    },
                );
                Ok(CreateOutcome::Created)
            }
        }
    }

    async fn list_containers(&self) -> Result<Vec<ContainerName>, StoreError> {
        Ok(self
            .lock()
            .containers
            .iter()
            .filter(|(_, c)| c.owned)
            .map(|(name, _)| name.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn bucket() -> ContainerName {
        ContainerName::parse("test-bucket").unwrap()
    }

    fn key(k: &str) -> ObjectKey {
        ObjectKey::parse(k).unwrap()
    }

    #[tokio::test]
    async fn create_container_outcomes() {
        let store = MemoryStore::new();
        assert_eq!(
            store.create_container(&bucket()).await.unwrap(),
            CreateOutcome::Created
        );
        assert_eq!(
            store.create_container(&bucket()).await.unwrap(),
            CreateOutcome::AlreadyOwned
        );

        let foreign = ContainerName::parse("someone-else").unwrap();
        store.add_foreign_container(&foreign);
        assert_eq!(
            store.create_container(&foreign).await.unwrap(),
            CreateOutcome::Denied
        );

        // Foreign containers are not listed as ours.
        assert_eq!(store.list_containers().await.unwrap(), vec![bucket()]);
    }

    #[tokio::test]
    async fn list_missing_container_fails() {
        let store = MemoryStore::new();
        let result = store.list_page(&bucket(), None).await;
        assert!(matches!(result, Err(StoreError::ContainerNotFound { .. })));
    }

    #[tokio::test]
    async fn list_empty_container() {
        let store = MemoryStore::new().with_container(&bucket());
        let page = store.list_page(&bucket(), None).await.unwrap();
        assert!(page.objects.is_empty());
        assert!(page.next_continuation.is_none());
    }

    #[tokio::test]
    async fn listing_paginates_in_key_order() {
        let store = MemoryStore::new().with_page_size(2);
        for name in ["c", "a", "e", "b", "d"] {
            store.insert_object(&bucket(), &key(name), name.as_bytes(), 4);
        }

        let first = store.list_page(&bucket(), None).await.unwrap();
        let keys: Vec<_> = first.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(first.next_continuation.as_deref(), Some("b"));

        let second = store.list_page(&bucket(), Some("b")).await.unwrap();
        let keys: Vec<_> = second.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "d"]);

        let third = store.list_page(&bucket(), Some("d")).await.unwrap();
        assert_eq!(third.objects.len(), 1);
        assert!(third.next_continuation.is_none());
    }

    #[tokio::test]
    async fn put_records_chunked_fingerprint() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("big.bin");
        std::fs::write(&source, vec![b'a'; 10]).unwrap();

        let store = MemoryStore::new().with_container(&bucket());
        let receipt = store
            .put(&PutRequest {
                container: bucket(),
                key: key("big.bin"),
                source,
                content_type: "application/octet-stream".into(),
                chunk_size: 4,
            })
            .await
            .unwrap();

        assert_eq!(
            receipt.fingerprint.as_str(),
            "\"1c06f341515fe359bacc890ca66aa673-3\""
        );
        assert_eq!(receipt.parts, 3);
        assert_eq!(receipt.size, 10);
        assert_eq!(store.put_count(), 1);

        let stored = store.object(&bucket(), &key("big.bin")).unwrap();
        assert_eq!(stored.data, vec![b'a'; 10]);
        assert_eq!(stored.content_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn put_empty_file_uses_empty_object_fingerprint() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("empty");
        std::fs::write(&source, b"").unwrap();

        let store = MemoryStore::new().with_container(&bucket());
        let receipt = store
            .put(&PutRequest {
                container: bucket(),
                key: key("empty"),
                source,
                content_type: "text/plain".into(),
                chunk_size: 4,
            })
            .await
            .unwrap();
        assert_eq!(receipt.fingerprint, Fingerprint::empty_object());
        assert_eq!(receipt.parts, 1);
    }

    #[tokio::test]
    async fn put_missing_source_is_source_read() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::new().with_container(&bucket());
        let result = store
            .put(&PutRequest {
                container: bucket(),
                key: key("gone.txt"),
                source: dir.path().join("gone.txt"),
                content_type: "text/plain".into(),
                chunk_size: 4,
            })
            .await;
        assert!(matches!(result, Err(StoreError::SourceRead { .. })));
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn injected_failures() {
        let store = MemoryStore::new().with_container(&bucket());
        store.fail_next_lists(1);

        let first = store.list_page(&bucket(), None).await;
        assert!(matches!(first, Err(StoreError::Throttled(_))));
        assert!(store.list_page(&bucket(), None).await.is_ok());
        assert_eq!(store.list_calls(), 2);

        store.deny_access(&bucket());
        let denied = store.list_page(&bucket(), None).await;
        assert!(matches!(denied, Err(StoreError::AccessDenied { .. })));
    }

    #[tokio::test]
    async fn rejected_key_fails_put() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        std::fs::write(&source, b"x").unwrap();

        let store = MemoryStore::new().with_container(&bucket());
        store.reject_key(&key("a.txt"), "policy");
        let result = store
            .put(&PutRequest {
                container: bucket(),
                key: key("a.txt"),
                source,
                content_type: "text/plain".into(),
                chunk_size: 4,
            })
            .await;
        assert!(matches!(result, Err(StoreError::Rejected { .. })));
    }

    #[tokio::test]
    async fn remove_and_reset() {
        let store = MemoryStore::new();
        store.insert_object(&bucket(), &key("a"), b"1", 4);
        assert_eq!(store.object_count(&bucket()), 1);
        assert!(store.remove_object(&bucket(), &key("a")));
        assert!(!store.remove_object(&bucket(), &key("a")));
        assert_eq!(store.object_count(&bucket()), 0);

        store.list_page(&bucket(), None).await.unwrap();
        store.reset_counters();
        assert_eq!(store.list_calls(), 0);
    }
}
