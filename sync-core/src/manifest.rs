//! Remote manifest: a point-in-time snapshot of a container.
//!
//! A manifest maps every object key in a container to its fingerprint.
//! It is built once per sync from a paginated listing and never refreshed
//! while the sync runs; concurrent changes to the container are not seen.

use std::collections::HashMap;
use sync_types::{ContainerName, Fingerprint, ObjectKey};
use thiserror::Error;

/// Errors while assembling a manifest from listing pages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    /// A page handed back the token that was used to request it.
    #[error("listing of {container} stalled at continuation token {token:?}")]
    PaginationStalled {
        /// Container being listed.
        container: ContainerName,
        /// The repeated token.
        token: String,
    },
}

/// Key → fingerprint snapshot of one container.
#[derive(Debug, Clone)]
pub struct RemoteManifest {
    container: ContainerName,
    entries: HashMap<ObjectKey, Fingerprint>,
}

impl RemoteManifest {
    /// An empty manifest for `container`.
    pub fn empty(container: ContainerName) -> Self {
        Self {
            container,
            entries: HashMap::new(),
        }
    }

    /// Container this snapshot was taken from.
    pub fn container(&self) -> &ContainerName {
        &self.container
    }

    /// Remote fingerprint for `key`, if the object exists.
    pub fn get(&self, key: &ObjectKey) -> Option<&Fingerprint> {
        self.entries.get(key)
    }

    /// Check whether `key` exists remotely.
    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of objects in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the container was empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key.
    pub fn sorted(&self) -> Vec<(&ObjectKey, &Fingerprint)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Accumulates listing pages into a [`RemoteManifest`].
///
/// Tracks continuation tokens so a listing that keeps returning the same
/// token is reported instead of looping forever.
#[derive(Debug)]
pub struct ManifestBuilder {
    manifest: RemoteManifest,
    next_token: Option<String>,
    pages: usize,
    finished: bool,
}

impl ManifestBuilder {
    /// Start a manifest for `container`.
    pub fn new(container: ContainerName) -> Self {
        Self {
            manifest: RemoteManifest::empty(container),
            next_token: None,
            pages: 0,
            finished: false,
        }
    }

    /// Token to request the next page with; `None` for the first page.
    pub fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }

    /// True once a page without a continuation token was added.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of pages consumed so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Add one page of listing results.
    ///
    /// `continuation` is the token the page returned for fetching the next
    /// page, `None` when the listing is complete.
    pub fn add_page<I>(&mut self, objects: I, continuation: Option<String>) -> Result<(), ManifestError>
    where
        I: IntoIterator<Item = (ObjectKey, Fingerprint)>,
    {
        self.manifest.entries.extend(objects);
        self.pages += 1;

        match continuation {
            None => {
                self.finished = true;
                self.next_token = None;
            }
            Some(token) => {
                if self.next_token.as_deref() == Some(token.as_str()) {
                    return Err(ManifestError::PaginationStalled {
                        container: self.manifest.container.clone(),
                        token,
                    });
                }
                self.next_token = Some(token);
            }
        }
        Ok(())
    }

    /// Finish and return the manifest.
    pub fn build(self) -> RemoteManifest {
        self.manifest
    }
}
