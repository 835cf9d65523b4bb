//! Resource name parsing and formatting.
//!
//! # Responsibility
//! - Parse caller-supplied resource names into store identifiers.
//! - Format store identifiers back into resource names.
//!
//! # Invariants
//! - Parsing is strict: no extra segments, no empty segments, uids must be
//!   positive integers.
//! - `format_*` output always parses back through the matching `parse_*`.

use crate::model::directory::SheetUid;
use crate::model::release::ReleaseUid;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static PROJECT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^projects/([^/]+)$").expect("valid project name regex"));
static RELEASE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^projects/([^/]+)/releases/([^/]+)$").expect("valid release name regex")
});
static SHEET_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^projects/([^/]+)/sheets/([^/]+)$").expect("valid sheet name regex")
});

const PROJECT_PATTERN: &str = "projects/{project}";
const RELEASE_PATTERN: &str = "projects/{project}/releases/{release}";
const SHEET_PATTERN: &str = "projects/{project}/sheets/{sheet}";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceNameError {
    #[error("invalid resource name `{name}`, expected `{expected}`")]
    InvalidFormat { name: String, expected: &'static str },
    #[error("invalid uid `{value}` in resource name `{name}`")]
    InvalidUid { name: String, value: String },
}

/// Extracts `{project}` from `projects/{project}`.
pub fn parse_project_id(name: &str) -> Result<String, ResourceNameError> {
    let caps = PROJECT_NAME_RE
        .captures(name)
        .ok_or_else(|| invalid_format(name, PROJECT_PATTERN))?;
    Ok(caps[1].to_string())
}

/// Extracts `({project}, {release})` from a release name.
pub fn parse_release_name(name: &str) -> Result<(String, ReleaseUid), ResourceNameError> {
    let caps = RELEASE_NAME_RE
        .captures(name)
        .ok_or_else(|| invalid_format(name, RELEASE_PATTERN))?;
    let uid = parse_uid(name, &caps[2])?;
    Ok((caps[1].to_string(), uid))
}

/// Extracts the release uid from a release name.
pub fn parse_release_uid(name: &str) -> Result<ReleaseUid, ResourceNameError> {
    parse_release_name(name).map(|(_, uid)| uid)
}

/// Extracts `({project}, {sheet})` from a sheet reference.
pub fn parse_sheet_name(name: &str) -> Result<(String, SheetUid), ResourceNameError> {
    let caps = SHEET_NAME_RE
        .captures(name)
        .ok_or_else(|| invalid_format(name, SHEET_PATTERN))?;
    let uid = parse_uid(name, &caps[2])?;
    Ok((caps[1].to_string(), uid))
}

pub fn format_project_name(project_id: &str) -> String {
    format!("projects/{project_id}")
}

pub fn format_release_name(project_id: &str, uid: ReleaseUid) -> String {
    format!("projects/{project_id}/releases/{uid}")
}

pub fn format_sheet_name(project_id: &str, uid: SheetUid) -> String {
    format!("projects/{project_id}/sheets/{uid}")
}

pub fn format_user_email(email: &str) -> String {
    format!("users/{email}")
}

fn parse_uid(name: &str, value: &str) -> Result<i64, ResourceNameError> {
    match value.parse::<i64>() {
        Ok(uid) if uid > 0 => Ok(uid),
        _ => Err(ResourceNameError::InvalidUid {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

fn invalid_format(name: &str, expected: &'static str) -> ResourceNameError {
    ResourceNameError::InvalidFormat {
        name: name.to_string(),
        expected,
    }
}
