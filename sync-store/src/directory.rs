//! Filesystem-backed object store.
//!
//! Each container is a directory under the store root:
//!
//! ```text
//! <root>/<container>/.etagsync-container   ownership marker (JSON)
//! <root>/<container>/objects/<entry>       object bytes
//! <root>/<container>/meta/<entry>.json     key, fingerprint, media type, size, parts
//! <root>/<container>/tmp/                  in-flight writes
//! ```
//!
//! `<entry>` is the hex MD5 of the object key, so every key maps to one
//! flat file name. Keys such as `docs` and `docs/index.html`, or `a` and
//! `a.partial`, never share or shadow a path. The key itself lives in the
//! metadata file.
//!
//! A directory without the marker belongs to someone else: requests
//! against it fail with `AccessDenied` and creating it reports
//! `CreateOutcome::Denied`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use sync_core::ChunkedHasher;
use sync_types::{ContainerName, CreateOutcome, Fingerprint, ObjectKey};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::StoreError;
use crate::store::{
    part_count, ListPage, ObjectStore, PutReceipt, PutRequest, RemoteObject, DEFAULT_PAGE_SIZE,
};

const MARKER_FILE: &str = ".etagsync-container";
const OBJECTS_DIR: &str = "objects";
const META_DIR: &str = "meta";
const TMP_DIR: &str = "tmp";
const META_SUFFIX: &str = ".json";
const COPY_BUFFER_SIZE: usize = 64 * 1024;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Metadata recorded next to every stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Object key.
    pub key: ObjectKey,
    /// Fingerprint computed while the object was written.
    pub fingerprint: Fingerprint,
    /// Media type given at upload.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Number of parts the upload used.
    pub parts: usize,
}

#[derive(Serialize)]
struct ContainerMarker<'a> {
    container: &'a str,
    created_unix: u64,
}

/// Object store that keeps containers as directories on local disk.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    page_size: usize,
}

impl DirectoryStore {
    /// Create a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the number of objects returned per listing page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the metadata of one object, `None` if it does not exist.
    pub async fn object_metadata(
        &self,
        container: &ContainerName,
        key: &ObjectKey,
    ) -> Result<Option<ObjectMetadata>, StoreError> {
        let dir = self.owned_dir(container).await?;
        match tokio::fs::read(meta_path(&dir, key)).await {
            Ok(bytes) => parse_metadata(&bytes).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the bytes of one object, `None` if it does not exist.
    pub async fn read_object(
        &self,
        container: &ContainerName,
        key: &ObjectKey,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        let dir = self.owned_dir(container).await?;
        match tokio::fs::read(object_path(&dir, key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn container_dir(&self, container: &ContainerName) -> PathBuf {
        self.root.join(container.as_str())
    }

    /// Resolve a container directory, checking that it exists and is ours.
    async fn owned_dir(&self, container: &ContainerName) -> Result<PathBuf, StoreError> {
        let dir = self.container_dir(container);
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(StoreError::AccessDenied {
                    container: container.to_string(),
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::ContainerNotFound {
                    container: container.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        }

        if is_marked(&dir).await? {
            Ok(dir)
        } else {
            Err(StoreError::AccessDenied {
                container: container.to_string(),
            })
        }
    }

    async fn write_object(
        &self,
        dir: &Path,
        request: &PutRequest,
    ) -> Result<PutReceipt, StoreError> {
        let mut hasher = ChunkedHasher::new(request.chunk_size)
            .map_err(|e| StoreError::InvalidRequest(e.to_string()))?;

        let source_err = |e: std::io::Error| StoreError::SourceRead {
            path: request.source.clone(),
            source: e,
        };
        let mut source = tokio::fs::File::open(&request.source)
            .await
            .map_err(source_err)?;

        for sub in [OBJECTS_DIR, META_DIR, TMP_DIR] {
            tokio::fs::create_dir_all(dir.join(sub)).await?;
        }
        let partial = temp_path(dir, &request.key);

        let mut dest = tokio::fs::File::create(&partial).await?;
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut size = 0u64;
        let copied: Result<(), StoreError> = async {
            loop {
                let n = source.read(&mut buf).await.map_err(source_err)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
                dest.write_all(&buf[..n]).await?;
                size += n as u64;
            }
            dest.flush().await?;
            Ok(())
        }
        .await;
        drop(dest);

        if let Err(e) = copied {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, object_path(dir, &request.key)).await?;

        let fingerprint = hasher.finalize().unwrap_or_else(Fingerprint::empty_object);
        let metadata = ObjectMetadata {
            key: request.key.clone(),
            fingerprint: fingerprint.clone(),
            content_type: request.content_type.clone(),
            size,
            parts: part_count(size, request.chunk_size),
        };
        write_metadata(dir, &metadata).await?;

        Ok(PutReceipt {
            fingerprint,
            size,
            parts: metadata.parts,
        })
    }
}

#[async_trait]
impl ObjectStore for DirectoryStore {
    async fn list_page(
        &self,
        container: &ContainerName,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let dir = self.owned_dir(container).await?;
        let meta_root = dir.join(META_DIR);

        let all = tokio::task::spawn_blocking(move || collect_objects(&meta_root))
            .await
            .map_err(|e| StoreError::Unavailable(format!("listing task failed: {e}")))??;

        let start = match continuation {
            None => 0,
            Some(token) => all.partition_point(|obj| obj.key.as_str() <= token),
        };
        let end = (start + self.page_size).min(all.len());
        let objects = all[start..end].to_vec();

        let next_continuation = if end < all.len() {
            objects.last().map(|obj| obj.key.clone())
        } else {
            None
        };

        debug!(
            container = %container,
            objects = objects.len(),
            more = next_continuation.is_some(),
            "listed page"
        );
        Ok(ListPage {
            objects,
            next_continuation,
        })
    }

    async fn put(&self, request: &PutRequest) -> Result<PutReceipt, StoreError> {
        let dir = self.owned_dir(&request.container).await?;
        let receipt = self.write_object(&dir, request).await?;
        debug!(
            container = %request.container,
            key = %request.key,
            size = receipt.size,
            parts = receipt.parts,
            "stored object"
        );
        Ok(receipt)
    }

    async fn create_container(
        &self,
        container: &ContainerName,
    ) -> Result<CreateOutcome, StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let dir = self.container_dir(container);

        match tokio::fs::create_dir(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let is_dir = tokio::fs::metadata(&dir).await?.is_dir();
                return if is_dir && is_marked(&dir).await? {
                    Ok(CreateOutcome::AlreadyOwned)
                } else {
                    Ok(CreateOutcome::Denied)
                };
            }
            Err(e) => return Err(e.into()),
        }

        for sub in [OBJECTS_DIR, META_DIR, TMP_DIR] {
            tokio::fs::create_dir(dir.join(sub)).await?;
        }

        let created_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let marker = serde_json::to_vec_pretty(&ContainerMarker {
            container: container.as_str(),
            created_unix,
        })
        .map_err(|e| StoreError::Metadata(e.to_string()))?;
        tokio::fs::write(dir.join(MARKER_FILE), marker).await?;

        debug!(container = %container, "created container");
        Ok(CreateOutcome::Created)
    }

    async fn list_containers(&self) -> Result<Vec<ContainerName>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut containers = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let Ok(container) = ContainerName::parse(&name) else {
                continue;
            };
            if is_marked(&entry.path()).await? {
                containers.push(container);
            }
        }
        containers.sort();
        Ok(containers)
    }
}

async fn is_marked(dir: &Path) -> Result<bool, StoreError> {
    match tokio::fs::metadata(dir.join(MARKER_FILE)).await {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Flat file name for a key.
fn entry_name(key: &ObjectKey) -> String {
    hex::encode(Md5::digest(key.as_str().as_bytes()))
}

fn object_path(dir: &Path, key: &ObjectKey) -> PathBuf {
    dir.join(OBJECTS_DIR).join(entry_name(key))
}

fn meta_path(dir: &Path, key: &ObjectKey) -> PathBuf {
    dir.join(META_DIR).join(format!("{}{META_SUFFIX}", entry_name(key)))
}

/// Unique scratch file under `tmp/`, outside the key namespace.
fn temp_path(dir: &Path, key: &ObjectKey) -> PathBuf {
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    dir.join(TMP_DIR).join(format!(
        "{}.{}-{seq}.partial",
        entry_name(key),
        std::process::id()
    ))
}

fn parse_metadata(bytes: &[u8]) -> Result<ObjectMetadata, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Metadata(e.to_string()))
}

async fn write_metadata(dir: &Path, metadata: &ObjectMetadata) -> Result<(), StoreError> {
    let bytes =
        serde_json::to_vec_pretty(metadata).map_err(|e| StoreError::Metadata(e.to_string()))?;
    let tmp = temp_path(dir, &metadata.key);
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, meta_path(dir, &metadata.key)).await?;
    Ok(())
}

/// Every object in a container, sorted by key. Runs on a blocking thread.
fn collect_objects(meta_root: &Path) -> Result<Vec<RemoteObject>, StoreError> {
    if !meta_root.is_dir() {
        return Ok(Vec::new());
    }

    let mut objects = Vec::new();
    for entry in WalkDir::new(meta_root).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| StoreError::Io(e.into()))?;
        let is_meta = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(META_SUFFIX));
        if !entry.file_type().is_file() || !is_meta {
            continue;
        }
        let bytes = std::fs::read(entry.path())?;
        match parse_metadata(&bytes) {
            Ok(metadata) => objects.push(RemoteObject {
                key: metadata.key.to_string(),
                fingerprint: metadata.fingerprint,
            }),
            Err(e) => warn!(
                path = %entry.path().display(),
                error = %e,
                "skipping malformed metadata entry"
            ),
        }
    }
    objects.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(objects)
}
