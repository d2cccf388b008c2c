//! CLI command implementations.
//!
//! Commands write their user-facing output to the writer they are given
//! (stdout in the binary) and return whether the run succeeded.

pub mod create_container;
pub mod list_containers;
pub mod list_objects;
pub mod sync;
