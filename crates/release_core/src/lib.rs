//! Core domain logic for project releases.
//! This crate is the single source of truth for release invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod pagination;
pub mod repo;
pub mod resource;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::directory::{Project, ProjectUid, Sheet, SheetUid, User, UserUid};
pub use model::payload::{PayloadFile, ReleasePayload, ReleaseRecord};
pub use model::release::{
    Release, ReleaseFile, ReleaseFileType, ReleaseState, ReleaseUid, VcsSource, VcsType,
};
pub use pagination::{decode_page_token, encode_page_token, PageTokenError};
pub use repo::{
    ProjectLookup, ProjectRepository, ReleaseListQuery, ReleasePatch, ReleaseRepository,
    ReleaseStore, RepoError, RepoResult, SheetRepository, SqliteStore, UserRepository,
};
pub use service::conversion::ConvertError;
pub use service::field_mask::{FieldMask, ReleaseField};
pub use service::release_service::{
    CreateReleaseRequest, ErrorKind, ListReleasesRequest, ListReleasesResponse,
    ReleaseService, ReleaseServiceConfig, ReleaseServiceError, ServiceResult,
    UpdateReleaseRequest, DEFAULT_PAGE_SIZE,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
