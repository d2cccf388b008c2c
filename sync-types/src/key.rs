//! Object keys and local file entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::KeyError;

/// A container-relative object key.
///
/// Always slash-separated regardless of the host's native path separator,
/// never empty, and never containing empty, `.` or `..` segments.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Build a key from a path relative to the sync root.
    ///
    /// Normal components are joined with `/`; `.` components are dropped.
    /// Roots, drive prefixes and `..` are rejected.
    pub fn from_relative_path(path: &Path) -> Result<Self, KeyError> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| KeyError::NonUtf8 {
                        path: path.to_path_buf(),
                    })?;
                    segments.push(part);
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(KeyError::NotRelative {
                        path: path.to_path_buf(),
                    })
                }
            }
        }

        if segments.is_empty() {
            return Err(KeyError::Empty);
        }

        Ok(Self(segments.join("/")))
    }

    /// Parse a key reported by a remote store.
    pub fn parse(key: &str) -> Result<Self, KeyError> {
        if key.is_empty() {
            return Err(KeyError::Empty);
        }
        if key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(KeyError::InvalidSegment {
                key: key.to_string(),
            });
        }
        Ok(Self(key.to_string()))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment of the key.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Lowercased extension of the last segment, if any.
    ///
    /// Dotfiles such as `.htaccess` have no extension.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectKey({})", self.0)
    }
}

impl TryFrom<String> for ObjectKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ObjectKey> for String {
    fn from(key: ObjectKey) -> Self {
        key.0
    }
}

/// A local file discovered under a sync root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    path: PathBuf,
    key: ObjectKey,
}

impl FileEntry {
    /// Create an entry for `path`, keyed relative to `root`.
    pub fn new(root: &Path, path: &Path) -> Result<Self, KeyError> {
        let relative = path.strip_prefix(root).map_err(|_| KeyError::OutsideRoot {
            path: path.to_path_buf(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            key: ObjectKey::from_relative_path(relative)?,
        })
    }

    /// Local filesystem path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Container-relative key.
    pub fn key(&self) -> &ObjectKey {
        &self.key
    }
}
