//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `release_core` linkage and schema bootstrap end to end.
//! - Route core `event=` lines to rolling files under the temp directory.
//! - Keep output deterministic for quick local sanity checks.

use release_core::db::migrations::latest_version;
use release_core::db::open_db_in_memory;
use release_core::resource::{format_project_name, format_sheet_name};
use release_core::{
    default_log_level, init_logging, CreateReleaseRequest, ListReleasesRequest,
    ProjectRepository, Release, ReleaseFile, ReleaseFileType, ReleaseService, SheetRepository,
    SqliteStore, UserRepository,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let log_dir = std::env::temp_dir().join("release_cli").join("logs");
    init_logging(default_log_level(), &log_dir.to_string_lossy())?;
    println!("release_core log_dir={}", log_dir.display());
    println!("release_core version={}", release_core::core_version());

    let conn = open_db_in_memory()?;
    println!("release_core schema_version={}", latest_version());

    let store = SqliteStore::try_new(&conn)?;
    let project = store.create_project("smoke", "Smoke")?;
    let caller = store.create_user("smoke@example.com")?;
    let sheet = store.create_sheet(project.uid, "SELECT 1;")?;

    let service = ReleaseService::new(store);
    let file = ReleaseFile {
        name: "0001_probe.sql".to_string(),
        sheet: format_sheet_name(&project.resource_id, sheet.uid),
        file_type: ReleaseFileType::Versioned,
        version: "0001".to_string(),
        ..ReleaseFile::default()
    };
    let created = service.create_release(
        &caller,
        &CreateReleaseRequest {
            parent: format_project_name(&project.resource_id),
            release: Some(Release::draft("smoke", vec![file])),
        },
    )?;
    println!("release_core release={} state={:?}", created.name, created.state);

    let listed = service.list_releases(&ListReleasesRequest {
        parent: format_project_name(&project.resource_id),
        ..ListReleasesRequest::default()
    })?;
    println!("release_core listed={}", listed.releases.len());
    Ok(())
}
