//! Release domain model.
//!
//! # Responsibility
//! - Define the external release view returned to callers.
//! - Define the internal stored payload persisted by the release store.
//! - Define read models for the directory collaborators (projects, users,
//!   sheets).
//!
//! # Invariants
//! - Releases are identified by a store-assigned uid that is never reused.
//! - Deletion is represented by the `deleted` flag, never by row removal.

pub mod directory;
pub mod payload;
pub mod release;
