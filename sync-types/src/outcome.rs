//! Per-file planning decisions and run outcomes.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::fingerprint::Fingerprint;
use crate::key::ObjectKey;

/// Why a file is being uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadReason {
    /// The key is absent from the remote manifest.
    New,
    /// The key exists remotely with a different fingerprint.
    Changed,
}

/// What the planner decided for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncDecision {
    /// Local and remote fingerprints match.
    Skip,
    /// The file must be transferred.
    Upload(UploadReason),
    /// The local file could not be verified.
    UploadFailed(String),
}

/// Final status of one processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Already up to date remotely.
    Skipped,
    /// Transferred to the remote store.
    Uploaded {
        /// Why it was uploaded.
        reason: UploadReason,
        /// Fingerprint the store recorded for the new object.
        fingerprint: Fingerprint,
    },
    /// Hashing, walking or transfer failed.
    Failed {
        /// Human-readable failure reason.
        reason: String,
    },
}

/// Outcome record emitted once per processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Remote key, when one could be derived.
    pub key: Option<ObjectKey>,
    /// Local path of the file.
    pub path: PathBuf,
    /// What happened.
    pub status: OutcomeStatus,
}

impl FileOutcome {
    /// Outcome for a skipped file.
    pub fn skipped(key: ObjectKey, path: &Path) -> Self {
        Self {
            key: Some(key),
            path: path.to_path_buf(),
            status: OutcomeStatus::Skipped,
        }
    }

    /// Outcome for an uploaded file.
    pub fn uploaded(
        key: ObjectKey,
        path: &Path,
        reason: UploadReason,
        fingerprint: Fingerprint,
    ) -> Self {
        Self {
            key: Some(key),
            path: path.to_path_buf(),
            status: OutcomeStatus::Uploaded {
                reason,
                fingerprint,
            },
        }
    }

    /// Outcome for a failed file.
    pub fn failed(key: Option<ObjectKey>, path: &Path, reason: impl Into<String>) -> Self {
        Self {
            key,
            path: path.to_path_buf(),
            status: OutcomeStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    /// True if this file failed.
    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }

    /// The key when present, otherwise the local path.
    pub fn label(&self) -> String {
        match &self.key {
            Some(key) => key.to_string(),
            None => self.path.display().to_string(),
        }
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            OutcomeStatus::Skipped => write!(f, "skipped   {}", self.label()),
            OutcomeStatus::Uploaded { .. } => write!(f, "uploaded  {}", self.label()),
            OutcomeStatus::Failed { reason } => {
                write!(f, "failed    {} ({})", self.label(), reason)
            }
        }
    }
}
