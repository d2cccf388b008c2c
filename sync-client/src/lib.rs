//! # sync-client
//!
//! Incremental sync of a local directory into a remote container.
//!
//! This is the library the `etagsync` CLI drives. It wires the pure
//! pieces from `sync-core` to real I/O: walking the local tree, listing
//! the remote container and uploading through an [`ObjectStore`].
//!
//! ## Features
//!
//! - **Fingerprint comparison**: unchanged files are skipped without
//!   downloading anything, using provider-compatible chunked ETags
//! - **Per-file isolation**: one unreadable or rejected file never stops
//!   the rest of the run
//! - **Store abstraction**: any [`ObjectStore`] works, including the
//!   retrying wrapper
//!
//! ## Example
//!
//! ```ignore
//! use sync_client::{SyncConfig, SyncExecutor};
//! use sync_store::DirectoryStore;
//!
//! let store = DirectoryStore::new("/srv/buckets");
//! let executor = SyncExecutor::new(store, SyncConfig::default());
//! let report = executor.sync(Path::new("./public"), &container).await?;
//! println!("{report}");
//! ```
//!
//! [`ObjectStore`]: sync_store::ObjectStore

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod executor;
pub mod manifest;
pub mod report;
pub mod walker;

pub use error::ClientError;
pub use executor::{SyncConfig, SyncExecutor, DEFAULT_CONTENT_TYPE};
pub use manifest::fetch_manifest;
pub use report::SyncReport;
pub use walker::{DirectoryWalker, Entries, WalkError, WalkOptions};
