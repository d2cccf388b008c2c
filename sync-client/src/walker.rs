//! Local directory traversal.
//!
//! [`DirectoryWalker`] turns a sync root into a lazy stream of
//! [`FileEntry`] values, one per regular file, keyed relative to the
//! root. Directories are descended into but never yielded.

use std::io;
use std::path::{Path, PathBuf};

use sync_types::{FileEntry, KeyError};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Errors from walking the local tree.
#[derive(Debug, Error)]
pub enum WalkError {
    /// The root does not exist or cannot be resolved.
    #[error("cannot open sync root {path}: {source}")]
    RootUnreadable {
        /// Root as given by the caller.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The root exists but is not a directory.
    #[error("sync root {path} is not a directory")]
    RootNotDirectory {
        /// Canonicalized root.
        path: PathBuf,
    },

    /// A subtree or entry could not be read.
    #[error("cannot read {path}: {message}")]
    Traverse {
        /// Path that failed.
        path: PathBuf,
        /// What went wrong (permission denied, link cycle, ...).
        message: String,
    },

    /// A file's path cannot be expressed as an object key.
    #[error("cannot derive key for {path}: {source}")]
    InvalidKey {
        /// Offending file.
        path: PathBuf,
        /// Why the key was rejected.
        source: KeyError,
    },
}

impl WalkError {
    /// Local path the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::RootUnreadable { path, .. }
            | Self::RootNotDirectory { path }
            | Self::Traverse { path, .. }
            | Self::InvalidKey { path, .. } => path,
        }
    }
}

/// Walker options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Follow symbolic links instead of skipping them.
    pub follow_symlinks: bool,
}

/// Depth-first walker over the regular files below a root.
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    root: PathBuf,
    options: WalkOptions,
}

impl DirectoryWalker {
    /// Create a walker for `root`.
    ///
    /// The root is canonicalized immediately; a missing root or one that
    /// is not a directory is an error here rather than during the walk.
    pub fn new(root: impl AsRef<Path>, options: WalkOptions) -> Result<Self, WalkError> {
        let given = root.as_ref();
        let root = std::fs::canonicalize(given).map_err(|e| WalkError::RootUnreadable {
            path: given.to_path_buf(),
            source: e,
        })?;
        if !root.is_dir() {
            return Err(WalkError::RootNotDirectory { path: root });
        }
        Ok(Self { root, options })
    }

    /// Canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walker options.
    pub fn options(&self) -> WalkOptions {
        self.options
    }

    /// Start a fresh traversal.
    ///
    /// Each call walks the tree again from the beginning. Entries within
    /// a directory come in file-name order, so two walks of an unchanged
    /// tree yield the same sequence.
    pub fn entries(&self) -> Entries<'_> {
        let inner = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(self.options.follow_symlinks)
            .sort_by_file_name()
            .into_iter();
        Entries {
            root: &self.root,
            inner,
        }
    }
}

/// Iterator returned by [`DirectoryWalker::entries`].
pub struct Entries<'a> {
    root: &'a Path,
    inner: walkdir::IntoIter,
}

impl Iterator for Entries<'_> {
    type Item = Result<FileEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(self.root).to_path_buf();
                    return Some(Err(WalkError::Traverse {
                        path,
                        message: e.to_string(),
                    }));
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            if file_type.is_symlink() {
                debug!(path = %entry.path().display(), "skipping symbolic link");
                continue;
            }
            if !file_type.is_file() {
                debug!(path = %entry.path().display(), "skipping special file");
                continue;
            }

            return Some(FileEntry::new(self.root, entry.path()).map_err(|e| {
                WalkError::InvalidKey {
                    path: entry.path().to_path_buf(),
                    source: e,
                }
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::tempdir;

    fn keys(walker: &DirectoryWalker) -> BTreeSet<String> {
        walker
            .entries()
            .map(|e| e.unwrap().key().to_string())
            .collect()
    }

    #[test]
    fn yields_files_not_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/dir")).unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("top.txt"), b"t").unwrap();
        fs::write(dir.path().join("sub/dir/a.txt"), b"a").unwrap();

        let walker = DirectoryWalker::new(dir.path(), WalkOptions::default()).unwrap();
        let expected: BTreeSet<String> = ["top.txt", "sub/dir/a.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(keys(&walker), expected);
    }

    #[test]
    fn order_is_depth_first_by_name() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("c.txt"), b"c").unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::write(dir.path().join("b/z.txt"), b"z").unwrap();
        fs::write(dir.path().join("b/y.txt"), b"y").unwrap();

        let walker = DirectoryWalker::new(dir.path(), WalkOptions::default()).unwrap();
        let order: Vec<String> = walker
            .entries()
            .map(|e| e.unwrap().key().to_string())
            .collect();
        assert_eq!(order, vec!["a.txt", "b/y.txt", "b/z.txt", "c.txt"]);
    }

    #[test]
    fn entries_is_restartable() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a"), b"a").unwrap();
        fs::write(dir.path().join("b"), b"b").unwrap();

        let walker = DirectoryWalker::new(dir.path(), WalkOptions::default()).unwrap();
        assert_eq!(walker.entries().count(), 2);
        assert_eq!(walker.entries().count(), 2);
    }

    #[test]
    fn root_is_canonicalized() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("site")).unwrap();
        fs::write(dir.path().join("site/index.html"), b"<html>").unwrap();

        let walker =
            DirectoryWalker::new(dir.path().join("site/../site"), WalkOptions::default()).unwrap();
        assert!(walker.root().is_absolute());
        assert!(!walker.root().ends_with(".."));

        let entry = walker.entries().next().unwrap().unwrap();
        assert_eq!(entry.key().as_str(), "index.html");
        assert!(entry.path().starts_with(walker.root()));
    }

    #[test]
    fn missing_root_is_error() {
        let dir = tempdir().unwrap();
        let result = DirectoryWalker::new(dir.path().join("nope"), WalkOptions::default());
        assert!(matches!(result, Err(WalkError::RootUnreadable { .. })));
    }

    #[test]
    fn file_root_is_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();
        let result = DirectoryWalker::new(&file, WalkOptions::default());
        assert!(matches!(result, Err(WalkError::RootNotDirectory { .. })));
    }

    #[test]
    fn empty_root_yields_nothing() {
        let dir = tempdir().unwrap();
        let walker = DirectoryWalker::new(dir.path(), WalkOptions::default()).unwrap();
        assert_eq!(walker.entries().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_skipped_unless_followed() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        fs::write(outside.path().join("shared.txt"), b"s").unwrap();
        fs::write(dir.path().join("own.txt"), b"o").unwrap();
        symlink(outside.path().join("shared.txt"), dir.path().join("link.txt")).unwrap();
        symlink(outside.path(), dir.path().join("linked-dir")).unwrap();

        let plain = DirectoryWalker::new(dir.path(), WalkOptions::default()).unwrap();
        let expected: BTreeSet<String> = ["own.txt"].iter().map(|s| s.to_string()).collect();
        assert_eq!(keys(&plain), expected);

        let following = DirectoryWalker::new(
            dir.path(),
            WalkOptions {
                follow_symlinks: true,
            },
        )
        .unwrap();
        let expected: BTreeSet<String> = ["own.txt", "link.txt", "linked-dir/shared.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(keys(&following), expected);
    }

    #[cfg(unix)]
    #[test]
    fn broken_link_is_per_entry_error_when_following() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        fs::write(dir.path().join("good.txt"), b"g").unwrap();
        symlink(dir.path().join("missing"), dir.path().join("dangling")).unwrap();

        let walker = DirectoryWalker::new(
            dir.path(),
            WalkOptions {
                follow_symlinks: true,
            },
        )
        .unwrap();
        let results: Vec<_> = walker.entries().collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Ok(e) if e.key().as_str() == "good.txt")));
    }
}
