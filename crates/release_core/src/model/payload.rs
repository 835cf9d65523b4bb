//! Internal stored release representation.
//!
//! # Responsibility
//! - Define the JSON payload persisted per release row.
//! - Define the full stored record returned by the release store.
//!
//! # Invariants
//! - `sheet_sha256` is written once at creation and never recomputed.
//! - Live sheet content is never part of the payload.

use crate::model::directory::{ProjectUid, UserUid};
use crate::model::release::{ReleaseFileType, ReleaseUid, VcsSource};
use serde::{Deserialize, Serialize};

/// Stored file entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadFile {
    pub name: String,
    pub sheet: String,
    pub sheet_sha256: String,
    #[serde(rename = "type", default)]
    pub file_type: ReleaseFileType,
    #[serde(default)]
    pub version: String,
}

/// Mutable-by-patch part of a stored release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub files: Vec<PayloadFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs_source: Option<VcsSource>,
}

/// Stored release row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub uid: ReleaseUid,
    pub project_uid: ProjectUid,
    pub creator_uid: UserUid,
    /// Epoch milliseconds, assigned by the store.
    pub created_at: i64,
    pub deleted: bool,
    pub payload: ReleasePayload,
}
