//! Release store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist release rows with a JSON payload column.
//! - Provide offset-paginated listing scoped to one project.
//! - Apply field-level patches (payload and/or soft-delete flag).
//!
//! # Invariants
//! - Rows are never physically deleted.
//! - `get_release` returns soft-deleted rows; listing hides them unless
//!   `show_deleted` is set.
//! - Listing order is `uid DESC` (newest first), stable across calls.

use crate::model::directory::{ProjectUid, UserUid};
use crate::model::payload::{ReleasePayload, ReleaseRecord};
use crate::model::release::ReleaseUid;
use crate::repo::{bool_to_int, int_to_bool, RepoError, RepoResult, SqliteStore};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const RELEASE_SELECT_SQL: &str = "SELECT
    uid,
    project_uid,
    creator_uid,
    created_at,
    deleted,
    payload
FROM releases";

/// Query options for listing releases of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseListQuery {
    pub project_uid: ProjectUid,
    pub limit: u32,
    pub offset: u32,
    pub show_deleted: bool,
}

/// Field-level patch for one release. `None` fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePatch {
    pub uid: ReleaseUid,
    pub payload: Option<ReleasePayload>,
    pub deleted: Option<bool>,
}

impl ReleasePatch {
    pub fn new(uid: ReleaseUid) -> Self {
        Self {
            uid,
            payload: None,
            deleted: None,
        }
    }

    pub fn soft_delete(uid: ReleaseUid, deleted: bool) -> Self {
        Self {
            deleted: Some(deleted),
            ..Self::new(uid)
        }
    }
}

/// Repository interface for release persistence.
pub trait ReleaseRepository {
    /// Inserts one release; the store assigns uid and creation time.
    fn create_release(
        &self,
        project_uid: ProjectUid,
        payload: &ReleasePayload,
        creator_uid: UserUid,
    ) -> RepoResult<ReleaseRecord>;
    /// Loads one release by uid, including soft-deleted rows.
    fn get_release(&self, uid: ReleaseUid) -> RepoResult<Option<ReleaseRecord>>;
    /// Lists releases of one project.
    fn list_releases(&self, query: &ReleaseListQuery) -> RepoResult<Vec<ReleaseRecord>>;
    /// Applies a patch and returns the updated row.
    fn update_release(&self, patch: &ReleasePatch) -> RepoResult<ReleaseRecord>;
}

impl ReleaseRepository for SqliteStore<'_> {
    fn create_release(
        &self,
        project_uid: ProjectUid,
        payload: &ReleasePayload,
        creator_uid: UserUid,
    ) -> RepoResult<ReleaseRecord> {
        let payload_json = serde_json::to_string(payload)?;
        self.conn.execute(
            "INSERT INTO releases (project_uid, creator_uid, payload)
             VALUES (?1, ?2, ?3);",
            params![project_uid, creator_uid, payload_json],
        )?;
        load_required_release(self.conn, self.conn.last_insert_rowid())
    }

    fn get_release(&self, uid: ReleaseUid) -> RepoResult<Option<ReleaseRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RELEASE_SELECT_SQL} WHERE uid = ?1;"))?;
        let mut rows = stmt.query([uid])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_release_row(row)?));
        }

        Ok(None)
    }

    fn list_releases(&self, query: &ReleaseListQuery) -> RepoResult<Vec<ReleaseRecord>> {
        let mut sql = format!("{RELEASE_SELECT_SQL} WHERE project_uid = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(query.project_uid)];

        if !query.show_deleted {
            sql.push_str(" AND deleted = 0");
        }

        sql.push_str(" ORDER BY uid DESC LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(i64::from(query.limit)));
        bind_values.push(Value::Integer(i64::from(query.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut releases = Vec::new();

        while let Some(row) = rows.next()? {
            releases.push(parse_release_row(row)?);
        }

        Ok(releases)
    }

    fn update_release(&self, patch: &ReleasePatch) -> RepoResult<ReleaseRecord> {
        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(payload) = &patch.payload {
            assignments.push("payload = ?");
            bind_values.push(Value::Text(serde_json::to_string(payload)?));
        }
        if let Some(deleted) = patch.deleted {
            assignments.push("deleted = ?");
            bind_values.push(Value::Integer(bool_to_int(deleted)));
        }

        if assignments.is_empty() {
            return load_required_release(self.conn, patch.uid);
        }

        let sql = format!(
            "UPDATE releases SET {} WHERE uid = ?;",
            assignments.join(", ")
        );
        bind_values.push(Value::Integer(patch.uid));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(not_found(patch.uid));
        }

        load_required_release(self.conn, patch.uid)
    }
}

fn load_required_release(conn: &Connection, uid: ReleaseUid) -> RepoResult<ReleaseRecord> {
    let record = conn
        .query_row(
            &format!("{RELEASE_SELECT_SQL} WHERE uid = ?1;"),
            [uid],
            |row| Ok(parse_release_row(row)),
        )
        .optional()?;
    match record {
        Some(record) => record,
        None => Err(not_found(uid)),
    }
}

fn parse_release_row(row: &Row<'_>) -> RepoResult<ReleaseRecord> {
    let payload_text: String = row.get("payload")?;
    let payload: ReleasePayload = serde_json::from_str(&payload_text)?;

    Ok(ReleaseRecord {
        uid: row.get("uid")?,
        project_uid: row.get("project_uid")?,
        creator_uid: row.get("creator_uid")?,
        created_at: row.get("created_at")?,
        deleted: int_to_bool("releases.deleted", row.get("deleted")?)?,
        payload,
    })
}

fn not_found(uid: ReleaseUid) -> RepoError {
    RepoError::NotFound {
        entity: "release",
        uid,
    }
}
