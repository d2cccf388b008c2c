//! # sync-store
//!
//! Remote object-store boundary for etagsync.
//!
//! The sync engine talks to storage only through the [`ObjectStore`]
//! trait: paginated listings, whole-file uploads and container
//! management. Two backends ship with the crate:
//!
//! - [`DirectoryStore`] keeps containers as directories on local disk,
//!   writing the same chunked fingerprints a hosted store reports
//! - [`MemoryStore`] keeps everything in memory and can inject failures,
//!   for tests
//!
//! [`RetryingStore`] wraps either one and retries transient failures
//! with bounded exponential backoff.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sync_store::{MemoryStore, ObjectStore};
//! use sync_types::{ContainerName, CreateOutcome};
//!
//! # async fn example() -> Result<(), sync_store::StoreError> {
//! let store = MemoryStore::new();
//! let container = ContainerName::parse("my-site").unwrap();
//! assert_eq!(store.create_container(&container).await?, CreateOutcome::Created);
//!
//! let page = store.list_page(&container, None).await?;
//! assert!(page.objects.is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod directory;
pub mod error;
pub mod memory;
pub mod retry;
pub mod store;

pub use directory::{DirectoryStore, ObjectMetadata};
pub use error::StoreError;
pub use memory::{MemoryStore, StoredObject};
pub use retry::RetryingStore;
pub use store::{ListPage, ObjectStore, PutReceipt, PutRequest, RemoteObject, DEFAULT_PAGE_SIZE};
