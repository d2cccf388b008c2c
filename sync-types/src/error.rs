//! Error types for etagsync value types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors building an [`ObjectKey`](crate::ObjectKey).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The key has no components.
    #[error("object key is empty")]
    Empty,

    /// A path component is not valid UTF-8.
    #[error("path component is not valid UTF-8: {path}")]
    NonUtf8 {
        /// The offending path.
        path: PathBuf,
    },

    /// The path contains `..`, a root, or a drive prefix.
    #[error("path is not a plain relative path: {path}")]
    NotRelative {
        /// The offending path.
        path: PathBuf,
    },

    /// The key contains an empty, `.` or `..` segment.
    #[error("invalid key segment in {key:?}")]
    InvalidSegment {
        /// The rejected key.
        key: String,
    },

    /// The path does not live under the sync root.
    #[error("{path} is outside the sync root")]
    OutsideRoot {
        /// The offending path.
        path: PathBuf,
    },
}

/// Errors validating a [`ContainerName`](crate::ContainerName).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerNameError {
    /// Length is outside 3..=63.
    #[error("container name must be 3-63 characters, got {0}")]
    Length(usize),

    /// A character outside `[a-z0-9.-]`.
    #[error("container name contains invalid character {0:?}")]
    InvalidChar(char),

    /// Does not start and end with a letter or digit.
    #[error("container name must start and end with a letter or digit")]
    Boundary,

    /// Contains two adjacent dots.
    #[error("container name must not contain '..'")]
    AdjacentDots,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ContainerNameError::InvalidChar('_');
        assert_eq!(err.to_string(), "container name contains invalid character '_'");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KeyError>();
        assert_send_sync::<ContainerNameError>();
    }
}
