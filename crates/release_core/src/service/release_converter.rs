//! Conversion between stored release records and the external view.
//!
//! # Responsibility
//! - Assemble the external release from a stored record plus its project,
//!   creator and live sheet content.
//! - Build the stored payload for a create request.
//!
//! # Invariants
//! - A stored release whose project or creator is missing is a consistency
//!   violation, reported as an error rather than skipped.
//! - Uid, creator and timestamps are never taken from caller input.

use crate::model::payload::{ReleasePayload, ReleaseRecord};
use crate::model::release::{Release, ReleaseState};
use crate::repo::{ProjectLookup, ProjectRepository, SheetRepository, UserRepository};
use crate::resource::{format_release_name, format_user_email};
use crate::service::conversion::{ConvertError, ConvertResult};
use crate::service::file_resolver::{files_from_payload, files_to_payload};

/// Builds the stored payload for a new release.
pub fn release_to_payload<S>(store: &S, release: &Release) -> ConvertResult<ReleasePayload>
where
    S: SheetRepository + ?Sized,
{
    Ok(ReleasePayload {
        title: release.title.clone(),
        files: files_to_payload(store, &release.files)?,
        vcs_source: release.vcs_source.clone(),
    })
}

/// Builds the external view of one stored release.
pub fn release_from_record<S>(store: &S, record: &ReleaseRecord) -> ConvertResult<Release>
where
    S: SheetRepository + ProjectRepository + UserRepository + ?Sized,
{
    let files = files_from_payload(store, &record.payload.files)?;

    let project = store
        .find_project(ProjectLookup::Uid(record.project_uid))
        .map_err(|err| ConvertError::repo("find project", err))?
        .ok_or(ConvertError::ProjectNotFound(record.project_uid))?;

    let creator = store
        .get_user_by_id(record.creator_uid)
        .map_err(|err| ConvertError::repo("get release creator", err))?
        .ok_or(ConvertError::CreatorNotFound(record.creator_uid))?;

    Ok(Release {
        name: format_release_name(&project.resource_id, record.uid),
        title: record.payload.title.clone(),
        files,
        vcs_source: record.payload.vcs_source.clone(),
        creator: format_user_email(&creator.email),
        create_time: record.created_at,
        state: ReleaseState::from_deleted(record.deleted),
    })
}

/// Builds external views for a page of stored releases.
pub fn releases_from_records<S>(
    store: &S,
    records: &[ReleaseRecord],
) -> ConvertResult<Vec<Release>>
where
    S: SheetRepository + ProjectRepository + UserRepository + ?Sized,
{
    records
        .iter()
        .map(|record| release_from_record(store, record))
        .collect()
}
