//! External release representation.
//!
//! # Responsibility
//! - Define the shape callers send and receive for release operations.
//! - Derive lifecycle state from the stored soft-delete flag.
//!
//! # Invariants
//! - `files` keeps caller-supplied order.
//! - `state` is computed on read and never persisted.

use serde::{Deserialize, Serialize};

/// Store-assigned release identifier.
pub type ReleaseUid = i64;

/// Kind of script carried by one release file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseFileType {
    #[default]
    Unspecified,
    /// Versioned schema-change script applied in `version` order.
    Versioned,
}

/// Version-control provider hosting the pull request a release came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VcsType {
    #[default]
    #[serde(rename = "VCS_TYPE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "GITHUB")]
    GitHub,
    #[serde(rename = "GITLAB")]
    GitLab,
    #[serde(rename = "BITBUCKET")]
    Bitbucket,
    #[serde(rename = "AZURE_DEVOPS")]
    AzureDevOps,
}

/// Pull request a release was cut from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsSource {
    pub vcs_type: VcsType,
    pub pull_request_url: String,
}

/// Lifecycle state derived from the soft-delete flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseState {
    Active,
    Deleted,
}

impl ReleaseState {
    pub fn from_deleted(deleted: bool) -> Self {
        if deleted {
            Self::Deleted
        } else {
            Self::Active
        }
    }
}

/// One file entry of a release as seen by callers.
///
/// On input only `name`, `sheet`, `file_type` and `version` are read; the
/// remaining fields are filled in on output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFile {
    pub name: String,
    /// Sheet reference, `projects/{project}/sheets/{uid}`.
    pub sheet: String,
    /// Checksum frozen when the release was created.
    pub sheet_sha256: String,
    #[serde(rename = "type")]
    pub file_type: ReleaseFileType,
    pub version: String,
    /// Live sheet content, resolved on every read.
    pub statement: String,
    /// Byte length of the live sheet content.
    pub statement_size: i64,
}

/// Release resource as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// `projects/{project}/releases/{uid}`. Empty on create input.
    pub name: String,
    pub title: String,
    pub files: Vec<ReleaseFile>,
    pub vcs_source: Option<VcsSource>,
    /// `users/{email}`. Output only.
    pub creator: String,
    /// Epoch milliseconds. Output only.
    pub create_time: i64,
    /// Output only.
    pub state: ReleaseState,
}

impl Release {
    /// Builds a create-request body with output-only fields left empty.
    pub fn draft(title: impl Into<String>, files: Vec<ReleaseFile>) -> Self {
        Self {
            name: String::new(),
            title: title.into(),
            files,
            vcs_source: None,
            creator: String::new(),
            create_time: 0,
            state: ReleaseState::Active,
        }
    }
}
