//! Error types for sync-store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during object-store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The container does not exist.
    #[error("container not found: {container}")]
    ContainerNotFound {
        /// Name of the missing container.
        container: String,
    },

    /// The caller may not access the container.
    #[error("access denied to container {container}")]
    AccessDenied {
        /// Name of the container.
        container: String,
    },

    /// The store asked the caller to slow down.
    #[error("request throttled: {0}")]
    Throttled(String),

    /// The store is temporarily unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store refused a specific object.
    #[error("object {key} rejected: {reason}")]
    Rejected {
        /// Key of the rejected object.
        key: String,
        /// Reason given by the store.
        reason: String,
    },

    /// The local source of an upload could not be read.
    #[error("cannot read {path}: {source}")]
    SourceRead {
        /// Local path being uploaded.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The request itself is malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Stored object metadata is missing or corrupt.
    #[error("metadata error: {0}")]
    Metadata(String),

    /// I/O error inside the store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True for failures worth retrying (throttling, outages).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Throttled(_) | Self::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(StoreError::Throttled("slow down".into()).is_transient());
        assert!(StoreError::Unavailable("reset".into()).is_transient());
        assert!(!StoreError::ContainerNotFound {
            container: "x".into()
        }
        .is_transient());
        assert!(!StoreError::AccessDenied {
            container: "x".into()
        }
        .is_transient());
    }

    #[test]
    fn error_display() {
        let err = StoreError::ContainerNotFound {
            container: "site".into(),
        };
        assert_eq!(err.to_string(), "container not found: site");
    }
}
