//! SyncExecutor - one-way incremental sync of a directory into a container.
//!
//! # Flow
//!
//! ```text
//! DirectoryWalker ──► FileEntry ──► plan_entry ──► (hash?) ──► resolve
//!                                       │                         │
//!                               RemoteManifest              Skip / Upload
//!                            (fetched once, up front)             │
//!                                                          ObjectStore::put
//! ```
//!
//! Files are processed strictly one at a time. Per-file failures become
//! `Failed` outcomes and the walk continues; only an invalid root or a
//! failed manifest fetch aborts the run.

use std::path::Path;

use sync_core::{
    guess_content_type, plan_entry, resolve, ChunkedHasher, HashError, PlanStep, RemoteManifest,
    DEFAULT_CHUNK_SIZE,
};
use sync_store::{ObjectStore, PutRequest};
use sync_types::{
    ContainerName, FileEntry, FileOutcome, Fingerprint, OutcomeStatus, SyncDecision, UploadReason,
};
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, warn};

use crate::error::ClientError;
use crate::manifest::fetch_manifest;
use crate::report::SyncReport;
use crate::walker::{DirectoryWalker, WalkOptions};

/// Media type used when the extension is not recognized.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Configuration for [`SyncExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Chunk size for fingerprints and multipart uploads.
    pub chunk_size: usize,
    /// Media type for files with unknown extensions.
    pub default_content_type: String,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
            follow_symlinks: false,
        }
    }
}

impl SyncConfig {
    /// Set the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the fallback media type.
    pub fn with_default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = content_type.into();
        self
    }

    /// Enable or disable following symbolic links.
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}

/// Drives a sync against one store.
#[derive(Debug)]
pub struct SyncExecutor<S> {
    store: S,
    config: SyncConfig,
}

impl<S: ObjectStore> SyncExecutor<S> {
    /// Create an executor.
    pub fn new(store: S, config: SyncConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Sync `root` into `container`.
    pub async fn sync(
        &self,
        root: &Path,
        container: &ContainerName,
    ) -> Result<SyncReport, ClientError> {
        self.sync_with(root, container, |_| {}).await
    }

    /// Sync `root` into `container`, calling `on_outcome` once per file as
    /// soon as its outcome is known.
    pub async fn sync_with<F>(
        &self,
        root: &Path,
        container: &ContainerName,
        mut on_outcome: F,
    ) -> Result<SyncReport, ClientError>
    where
        F: FnMut(&FileOutcome),
    {
        let walker = DirectoryWalker::new(
            root,
            WalkOptions {
                follow_symlinks: self.config.follow_symlinks,
            },
        )
        .map_err(|e| {
            error!(root = %root.display(), error = %e, "sync aborted");
            e
        })?;

        let manifest = match fetch_manifest(&self.store, container).await {
            Ok(manifest) => manifest,
            Err(e) => {
                error!(container = %container, error = %e, "sync aborted");
                return Err(e);
            }
        };

        info!(
            root = %walker.root().display(),
            container = %container,
            remote_objects = manifest.len(),
            "starting sync"
        );

        let mut report = SyncReport::new();
        for item in walker.entries() {
            let outcome = match item {
                Ok(entry) => self.process(&manifest, container, &entry).await,
                Err(e) => FileOutcome::failed(None, e.path(), e.to_string()),
            };
            log_outcome(&outcome);
            on_outcome(&outcome);
            report.record(outcome);
        }

        info!(
            container = %container,
            uploaded = report.uploaded(),
            skipped = report.skipped(),
            failed = report.failed(),
            "sync finished"
        );
        Ok(report)
    }

    async fn process(
        &self,
        manifest: &RemoteManifest,
        container: &ContainerName,
        entry: &FileEntry,
    ) -> FileOutcome {
        let decision = match plan_entry(manifest, entry.key()) {
            PlanStep::Decided(decision) => decision,
            PlanStep::NeedsFingerprint(remote) => {
                resolve(remote, self.fingerprint_file(entry.path()).await)
            }
        };

        match decision {
            SyncDecision::Skip => FileOutcome::skipped(entry.key().clone(), entry.path()),
            SyncDecision::UploadFailed(reason) => {
                FileOutcome::failed(Some(entry.key().clone()), entry.path(), reason)
            }
            SyncDecision::Upload(reason) => self.upload(container, entry, reason).await,
        }
    }

    async fn upload(
        &self,
        container: &ContainerName,
        entry: &FileEntry,
        reason: UploadReason,
    ) -> FileOutcome {
        let content_type = guess_content_type(entry.key())
            .unwrap_or(self.config.default_content_type.as_str())
            .to_string();

        let request = PutRequest {
            container: container.clone(),
            key: entry.key().clone(),
            source: entry.path().to_path_buf(),
            content_type,
            chunk_size: self.config.chunk_size,
        };

        match self.store.put(&request).await {
            Ok(receipt) => {
                FileOutcome::uploaded(entry.key().clone(), entry.path(), reason, receipt.fingerprint)
            }
            Err(e) => FileOutcome::failed(Some(entry.key().clone()), entry.path(), e.to_string()),
        }
    }

    /// Fingerprint a local file. `Ok(None)` for an empty file.
    async fn fingerprint_file(&self, path: &Path) -> Result<Option<Fingerprint>, HashError> {
        let mut hasher = ChunkedHasher::new(self.config.chunk_size)?;
        let mut file = tokio::fs::File::open(path).await?;
        let mut buf = vec![0u8; HASH_BUFFER_SIZE];
        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hasher.finalize())
    }
}

fn log_outcome(outcome: &FileOutcome) {
    let label = outcome.label();
    match &outcome.status {
        OutcomeStatus::Skipped => debug!(key = %label, "up to date"),
        OutcomeStatus::Uploaded {
            reason,
            fingerprint,
        } => info!(key = %label, ?reason, fingerprint = %fingerprint, "uploaded"),
        OutcomeStatus::Failed { reason } => warn!(key = %label, reason = %reason, "failed"),
    }
}
