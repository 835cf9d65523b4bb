//! Project directory contract and SQLite implementation.

use crate::model::directory::{Project, ProjectUid};
use crate::repo::{RepoResult, SqliteStore};
use rusqlite::{params, OptionalExtension, Row};

/// Key used to find one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectLookup<'a> {
    Uid(ProjectUid),
    ResourceId(&'a str),
}

/// Repository interface for project lookups.
pub trait ProjectRepository {
    /// Finds one project, `None` when absent.
    fn find_project(&self, lookup: ProjectLookup<'_>) -> RepoResult<Option<Project>>;
    /// Registers one project under a unique resource id.
    fn create_project(&self, resource_id: &str, title: &str) -> RepoResult<Project>;
}

impl ProjectRepository for SqliteStore<'_> {
    fn find_project(&self, lookup: ProjectLookup<'_>) -> RepoResult<Option<Project>> {
        let project = match lookup {
            ProjectLookup::Uid(uid) => self
                .conn
                .query_row(
                    "SELECT uid, resource_id, title FROM projects WHERE uid = ?1;",
                    [uid],
                    parse_project_row,
                )
                .optional()?,
            ProjectLookup::ResourceId(resource_id) => self
                .conn
                .query_row(
                    "SELECT uid, resource_id, title FROM projects WHERE resource_id = ?1;",
                    [resource_id],
                    parse_project_row,
                )
                .optional()?,
        };
        Ok(project)
    }

    fn create_project(&self, resource_id: &str, title: &str) -> RepoResult<Project> {
        self.conn.execute(
            "INSERT INTO projects (resource_id, title) VALUES (?1, ?2);",
            params![resource_id, title],
        )?;
        Ok(Project {
            uid: self.conn.last_insert_rowid(),
            resource_id: resource_id.to_string(),
            title: title.to_string(),
        })
    }
}

fn parse_project_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        uid: row.get("uid")?,
        resource_id: row.get("resource_id")?,
        title: row.get("title")?,
    })
}
