//! Read models for the collaborators a release points at.

pub type ProjectUid = i64;
pub type UserUid = i64;
pub type SheetUid = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub uid: ProjectUid,
    /// Stable, human-chosen id used in resource names.
    pub resource_id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uid: UserUid,
    pub email: String,
}

/// Script content entry from the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub uid: SheetUid,
    pub project_uid: ProjectUid,
    /// Lowercase hex SHA-256 of the current statement.
    pub sha256: String,
    /// `None` unless loaded with `load_full = true`.
    pub statement: Option<String>,
    /// Byte length of the current statement.
    pub size: i64,
}
