//! # sync-types
//!
//! Value types shared by every etagsync crate.
//!
//! - [`ObjectKey`], [`ContainerName`] - validated remote identifiers
//! - [`Fingerprint`] - provider-compatible content fingerprint (ETag)
//! - [`FileEntry`] - a local file paired with its remote key
//! - [`SyncDecision`], [`FileOutcome`] - per-file planning and results
//! - [`CreateOutcome`] - result of an idempotent container create

#![warn(missing_docs)]
#![warn(clippy::all)]

mod container;
mod error;
mod fingerprint;
mod key;
mod outcome;

pub use container::{ContainerName, CreateOutcome};
pub use error::{ContainerNameError, KeyError};
pub use fingerprint::Fingerprint;
pub use key::{FileEntry, ObjectKey};
pub use outcome::{FileOutcome, OutcomeStatus, SyncDecision, UploadReason};
