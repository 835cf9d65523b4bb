//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contracts the release service depends on.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Lookups return `Ok(None)` for absent rows; writes addressed by uid
//!   return `RepoError::NotFound` when the row does not exist.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use rusqlite::Connection;
use thiserror::Error;

pub mod project_repo;
pub mod release_repo;
pub mod sheet_repo;
pub mod user_repo;

pub use project_repo::{ProjectLookup, ProjectRepository};
pub use release_repo::{ReleaseListQuery, ReleasePatch, ReleaseRepository};
pub use sheet_repo::SheetRepository;
pub use user_repo::UserRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all SQLite-backed collaborators.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Db(#[from] DbError),
    #[error("{entity} not found: {uid}")]
    NotFound { entity: &'static str, uid: i64 },
    #[error("store requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("store requires table `{0}`")]
    MissingRequiredTable(&'static str),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error("release payload cannot be encoded or decoded: {0}")]
    Payload(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Every collaborator the release service talks to, as one bound.
pub trait ReleaseStore:
    ReleaseRepository + ProjectRepository + SheetRepository + UserRepository
{
}

impl<T> ReleaseStore for T where
    T: ReleaseRepository + ProjectRepository + SheetRepository + UserRepository
{
}

const REQUIRED_TABLES: &[&str] = &["projects", "principals", "sheets", "releases"];

/// SQLite-backed store implementing every collaborator contract.
///
/// Borrowing the connection keeps one store per request; the connection
/// itself serializes writes.
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    /// Constructs a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(column: &str, value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
