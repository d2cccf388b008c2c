//! Error types for sync-client.

use sync_core::ManifestError;
use sync_store::StoreError;
use thiserror::Error;

use crate::walker::WalkError;

/// Errors that abort a sync run before any file is processed.
///
/// Failures of individual files never surface here; they become
/// `Failed` outcomes in the report.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The local root cannot be walked.
    #[error("invalid sync root: {0}")]
    InvalidRoot(#[from] WalkError),

    /// The remote listing failed.
    #[error("cannot list remote container: {0}")]
    Store(#[from] StoreError),

    /// The remote listing was inconsistent.
    #[error("cannot build remote manifest: {0}")]
    Manifest(#[from] ManifestError),
}
