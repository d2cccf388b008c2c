//! # sync-core
//!
//! Pure logic for etagsync (no network I/O, instant tests).
//!
//! This crate implements the algorithms behind an incremental sync
//! without talking to any remote store, enabling fast unit tests.
//!
//! ## Modules
//!
//! - [`hasher`] - chunked MD5 fingerprints matching the provider's
//!   multipart ETag scheme
//! - [`manifest`] - point-in-time key → fingerprint snapshot of a container
//! - [`planner`] - skip / upload decision per file
//! - [`retry`] - bounded exponential backoff for transient store errors
//! - [`content_type`] - media type inference from file extensions
//!
//! The actual I/O (listing, uploading, walking) is performed by
//! `sync-client`, which feeds bytes and listings into these pieces.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod content_type;
pub mod hasher;
pub mod manifest;
pub mod planner;
pub mod retry;

pub use content_type::guess_content_type;
pub use hasher::{
    fingerprint_bytes, fingerprint_reader, ChunkedHasher, HashError, DEFAULT_CHUNK_SIZE,
};
pub use manifest::{ManifestBuilder, ManifestError, RemoteManifest};
pub use planner::{plan_entry, resolve, PlanStep};
pub use retry::RetryPolicy;
