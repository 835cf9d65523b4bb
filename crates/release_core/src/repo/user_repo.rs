//! Identity directory contract and SQLite implementation.

use crate::model::directory::{User, UserUid};
use crate::repo::{RepoResult, SqliteStore};
use rusqlite::OptionalExtension;

/// Repository interface for principal lookups.
pub trait UserRepository {
    /// Loads one user by uid, `None` when absent.
    fn get_user_by_id(&self, uid: UserUid) -> RepoResult<Option<User>>;
    /// Registers one user with a unique email.
    fn create_user(&self, email: &str) -> RepoResult<User>;
}

impl UserRepository for SqliteStore<'_> {
    fn get_user_by_id(&self, uid: UserUid) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT uid, email FROM principals WHERE uid = ?1;",
                [uid],
                |row| {
                    Ok(User {
                        uid: row.get("uid")?,
                        email: row.get("email")?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn create_user(&self, email: &str) -> RepoResult<User> {
        self.conn
            .execute("INSERT INTO principals (email) VALUES (?1);", [email])?;
        Ok(User {
            uid: self.conn.last_insert_rowid(),
            email: email.to_string(),
        })
    }
}
