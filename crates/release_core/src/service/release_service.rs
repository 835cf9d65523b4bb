//! Release use-case service.
//!
//! # Responsibility
//! - Expose create/get/list/update/delete/undelete for releases.
//! - Validate requests before touching any store.
//! - Map store and conversion failures to semantic error kinds.
//!
//! # Invariants
//! - `ACTIVE --delete--> DELETED --undelete--> ACTIVE`; both patches are
//!   issued unconditionally.
//! - Update is rejected on a deleted release and only ever patches fields
//!   named by `ReleaseField`.
//! - The service holds no state across calls beyond its store handle.

use crate::model::directory::{Project, User};
use crate::model::payload::ReleaseRecord;
use crate::model::release::{Release, ReleaseUid};
use crate::pagination::{encode_page_token, resolve_limit_and_offset};
use crate::repo::{ProjectLookup, ReleaseListQuery, ReleasePatch, ReleaseStore, RepoError};
use crate::resource::{parse_project_id, parse_release_uid};
use crate::service::conversion::ConvertError;
use crate::service::field_mask::{FieldMask, ReleaseField};
use crate::service::release_converter::{
    release_from_record, release_to_payload, releases_from_records,
};
use log::{error, info};
use thiserror::Error;

/// Page size used when a list request supplies neither a size nor a token.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

pub type ServiceResult<T> = Result<T, ReleaseServiceError>;

/// Tunables for the release service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseServiceConfig {
    /// Substituted when a list request resolves to a zero page size.
    /// Zero is replaced by `DEFAULT_PAGE_SIZE`.
    pub default_page_size: u32,
}

impl Default for ReleaseServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ReleaseServiceConfig {
    // Page tokens only advance with a non-zero limit.
    fn normalized(self) -> Self {
        if self.default_page_size == 0 {
            Self::default()
        } else {
            self
        }
    }
}

/// Semantic error kind, independent of any transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    FailedPrecondition,
    Internal,
}

/// Service error for release use-cases.
#[derive(Debug, Error)]
pub enum ReleaseServiceError {
    /// Malformed request; raised before any store call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Project, release or sheet is absent.
    #[error("not found: {0}")]
    NotFound(String),
    /// Update attempted on a deleted release.
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),
    /// Collaborator failure or broken internal consistency.
    #[error("internal: {0}")]
    Internal(String),
}

impl ReleaseServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::FailedPrecondition(_) => ErrorKind::FailedPrecondition,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReleaseRequest {
    /// `projects/{project}`.
    pub parent: String,
    pub release: Option<Release>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListReleasesRequest {
    /// `projects/{project}`.
    pub parent: String,
    /// Must be non-negative; zero selects the default page size.
    pub page_size: i32,
    pub page_token: Option<String>,
    pub show_deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListReleasesResponse {
    pub releases: Vec<Release>,
    /// Present only when more releases may follow.
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReleaseRequest {
    /// Only `name` and the fields named by `update_mask` are read.
    pub release: Release,
    pub update_mask: Option<FieldMask>,
}

/// Release service facade over a release store.
pub struct ReleaseService<S: ReleaseStore> {
    store: S,
    config: ReleaseServiceConfig,
}

impl<S: ReleaseStore> ReleaseService<S> {
    /// Creates a service with default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, ReleaseServiceConfig::default())
    }

    pub fn with_config(store: S, config: ReleaseServiceConfig) -> Self {
        Self {
            store,
            config: config.normalized(),
        }
    }

    /// Creates one release in the parent project on behalf of `caller`.
    ///
    /// Sheet checksums are captured now and never refreshed afterwards.
    pub fn create_release(
        &self,
        caller: &User,
        request: &CreateReleaseRequest,
    ) -> ServiceResult<Release> {
        let body = request
            .release
            .as_ref()
            .ok_or_else(|| invalid_argument("release must be set"))?;
        let project = self.require_project(&request.parent)?;

        let payload = release_to_payload(&self.store, body).map_err(create_conversion_error)?;
        let record = self
            .store
            .create_release(project.uid, &payload, caller.uid)
            .map_err(|err| internal("failed to create release", err))?;

        info!(
            "event=release_create module=release_service status=ok release_uid={} project={} files={}",
            record.uid,
            project.resource_id,
            record.payload.files.len()
        );
        self.to_release(&record)
    }

    /// Gets one release by name, including soft-deleted ones.
    pub fn get_release(&self, name: &str) -> ServiceResult<Release> {
        let uid = release_uid(name)?;
        let record = self.require_release(uid)?;
        self.to_release(&record)
    }

    /// Lists one page of releases in the parent project.
    ///
    /// Pages are offset-based: releases created or deleted between calls
    /// can shift rows across page boundaries.
    pub fn list_releases(
        &self,
        request: &ListReleasesRequest,
    ) -> ServiceResult<ListReleasesResponse> {
        let page_size = u32::try_from(request.page_size).map_err(|_| {
            invalid_argument(format!(
                "page size must be non-negative: {}",
                request.page_size
            ))
        })?;
        let (limit, offset) = resolve_limit_and_offset(
            request.page_token.as_deref(),
            page_size,
            self.config.default_page_size,
        )
        .map_err(|err| invalid_argument(format!("invalid page token: {err}")))?;
        let project = self.require_project(&request.parent)?;

        let query = ReleaseListQuery {
            project_uid: project.uid,
            limit: limit.saturating_add(1),
            offset,
            show_deleted: request.show_deleted,
        };
        let mut records = self
            .store
            .list_releases(&query)
            .map_err(|err| internal("failed to list releases", err))?;

        let page_len = usize::try_from(limit).unwrap_or(usize::MAX);
        let next_page_token = if records.len() > page_len {
            records.truncate(page_len);
            Some(encode_page_token(limit, offset.saturating_add(limit)))
        } else {
            None
        };

        let releases =
            releases_from_records(&self.store, &records).map_err(read_conversion_error)?;
        Ok(ListReleasesResponse {
            releases,
            next_page_token,
        })
    }

    /// Patches the fields of one release named by the update mask.
    ///
    /// Paths without a matching `ReleaseField` are ignored.
    pub fn update_release(&self, request: &UpdateReleaseRequest) -> ServiceResult<Release> {
        let mask = request
            .update_mask
            .as_ref()
            .ok_or_else(|| invalid_argument("update_mask must be set"))?;
        let uid = release_uid(&request.release.name)?;

        let existing = self.require_release(uid)?;
        if existing.deleted {
            return Err(ReleaseServiceError::FailedPrecondition(format!(
                "release {uid} is deleted"
            )));
        }

        let mut patch = ReleasePatch::new(uid);
        for field in mask.release_fields() {
            match field {
                ReleaseField::Title => {
                    let payload = patch
                        .payload
                        .get_or_insert_with(|| existing.payload.clone());
                    payload.title = request.release.title.clone();
                }
            }
        }

        let record = self
            .store
            .update_release(&patch)
            .map_err(|err| store_error("failed to update release", err))?;
        info!(
            "event=release_update module=release_service status=ok release_uid={} payload_changed={}",
            uid,
            patch.payload.is_some()
        );
        self.to_release(&record)
    }

    /// Soft-deletes one release. Deleting a deleted release succeeds.
    pub fn delete_release(&self, name: &str) -> ServiceResult<()> {
        let uid = release_uid(name)?;
        self.store
            .update_release(&ReleasePatch::soft_delete(uid, true))
            .map_err(|err| store_error("failed to delete release", err))?;
        info!("event=release_delete module=release_service status=ok release_uid={uid}");
        Ok(())
    }

    /// Restores one soft-deleted release. Undeleting an active release succeeds.
    pub fn undelete_release(&self, name: &str) -> ServiceResult<Release> {
        let uid = release_uid(name)?;
        let record = self
            .store
            .update_release(&ReleasePatch::soft_delete(uid, false))
            .map_err(|err| store_error("failed to undelete release", err))?;
        info!("event=release_undelete module=release_service status=ok release_uid={uid}");
        self.to_release(&record)
    }

    fn require_project(&self, parent: &str) -> ServiceResult<Project> {
        let project_id = parse_project_id(parent)
            .map_err(|err| invalid_argument(format!("failed to get project id: {err}")))?;
        self.store
            .find_project(ProjectLookup::ResourceId(&project_id))
            .map_err(|err| internal("failed to find project", err))?
            .ok_or_else(|| {
                ReleaseServiceError::NotFound(format!("project {project_id} not found"))
            })
    }

    fn require_release(&self, uid: ReleaseUid) -> ServiceResult<ReleaseRecord> {
        self.store
            .get_release(uid)
            .map_err(|err| internal("failed to get release", err))?
            .ok_or_else(|| ReleaseServiceError::NotFound(format!("release {uid} not found")))
    }

    fn to_release(&self, record: &ReleaseRecord) -> ServiceResult<Release> {
        release_from_record(&self.store, record).map_err(read_conversion_error)
    }
}

fn release_uid(name: &str) -> ServiceResult<ReleaseUid> {
    parse_release_uid(name)
        .map_err(|err| invalid_argument(format!("failed to get release uid: {err}")))
}

fn invalid_argument(message: impl Into<String>) -> ReleaseServiceError {
    ReleaseServiceError::InvalidArgument(message.into())
}

fn internal(context: &str, err: impl std::fmt::Display) -> ReleaseServiceError {
    error!(
        "event=release_store module=release_service status=error context=\"{}\" error={}",
        context, err
    );
    ReleaseServiceError::Internal(format!("{context}: {err}"))
}

fn store_error(context: &str, err: RepoError) -> ReleaseServiceError {
    match err {
        RepoError::NotFound { entity, uid } => {
            ReleaseServiceError::NotFound(format!("{entity} {uid} not found"))
        }
        other => internal(context, other),
    }
}

// Input problems surface to the caller; anything else is on our side.
fn create_conversion_error(err: ConvertError) -> ReleaseServiceError {
    match err {
        ConvertError::InvalidSheetName { .. } => invalid_argument(err.to_string()),
        ConvertError::SheetNotFound(_) => ReleaseServiceError::NotFound(err.to_string()),
        other => internal("failed to convert files", other),
    }
}

fn read_conversion_error(err: ConvertError) -> ReleaseServiceError {
    internal("failed to convert release", err)
}
