//! Content store contract and SQLite implementation.
//!
//! # Responsibility
//! - Serve sheet metadata and, on request, full statement text.
//! - Maintain the statement checksum and size on every write.
//!
//! # Invariants
//! - `sha256` and `size` always describe the current `statement`.
//! - `get_sheet(.., false)` never returns statement text.

use crate::model::directory::{ProjectUid, Sheet, SheetUid};
use crate::repo::{bool_to_int, RepoError, RepoResult, SqliteStore};
use rusqlite::{params, OptionalExtension, Row};
use sha2::{Digest, Sha256};

/// Repository interface for sheet content.
pub trait SheetRepository {
    /// Loads one sheet; statement text is included only when `load_full`.
    fn get_sheet(&self, uid: SheetUid, load_full: bool) -> RepoResult<Option<Sheet>>;
    /// Stores a new sheet and returns it fully loaded.
    fn create_sheet(&self, project_uid: ProjectUid, statement: &str) -> RepoResult<Sheet>;
    /// Replaces sheet content, recomputing checksum and size.
    fn update_sheet_statement(&self, uid: SheetUid, statement: &str) -> RepoResult<Sheet>;
}

/// Lowercase hex SHA-256 of statement bytes.
pub fn statement_sha256(statement: &str) -> String {
    hex::encode(Sha256::digest(statement.as_bytes()))
}

impl SheetRepository for SqliteStore<'_> {
    fn get_sheet(&self, uid: SheetUid, load_full: bool) -> RepoResult<Option<Sheet>> {
        let sheet = self
            .conn
            .query_row(
                "SELECT
                    uid,
                    project_uid,
                    sha256,
                    size,
                    CASE WHEN ?2 = 1 THEN statement ELSE NULL END AS statement
                 FROM sheets
                 WHERE uid = ?1;",
                params![uid, bool_to_int(load_full)],
                parse_sheet_row,
            )
            .optional()?;
        Ok(sheet)
    }

    fn create_sheet(&self, project_uid: ProjectUid, statement: &str) -> RepoResult<Sheet> {
        let sha256 = statement_sha256(statement);
        let size = statement_size(statement)?;
        self.conn.execute(
            "INSERT INTO sheets (project_uid, statement, sha256, size)
             VALUES (?1, ?2, ?3, ?4);",
            params![project_uid, statement, sha256, size],
        )?;
        Ok(Sheet {
            uid: self.conn.last_insert_rowid(),
            project_uid,
            sha256,
            statement: Some(statement.to_string()),
            size,
        })
    }

    fn update_sheet_statement(&self, uid: SheetUid, statement: &str) -> RepoResult<Sheet> {
        let sha256 = statement_sha256(statement);
        let size = statement_size(statement)?;
        let changed = self.conn.execute(
            "UPDATE sheets
             SET
                statement = ?2,
                sha256 = ?3,
                size = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uid = ?1;",
            params![uid, statement, sha256, size],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "sheet",
                uid,
            });
        }

        self.get_sheet(uid, true)?.ok_or(RepoError::NotFound {
            entity: "sheet",
            uid,
        })
    }
}

fn statement_size(statement: &str) -> RepoResult<i64> {
    i64::try_from(statement.len())
        .map_err(|_| RepoError::InvalidData("sheet statement exceeds i64 bytes".to_string()))
}

fn parse_sheet_row(row: &Row<'_>) -> rusqlite::Result<Sheet> {
    Ok(Sheet {
        uid: row.get("uid")?,
        project_uid: row.get("project_uid")?,
        sha256: row.get("sha256")?,
        statement: row.get("statement")?,
        size: row.get("size")?,
    })
}

#[cfg(test)]
mod tests {
    use super::statement_sha256;

    #[test]
    fn checksum_is_lowercase_hex_sha256() {
        assert_eq!(
            statement_sha256(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(statement_sha256("SELECT 1;").len(), 64);
    }
}
