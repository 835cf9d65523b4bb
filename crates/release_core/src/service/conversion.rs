//! Errors raised while converting between stored and external releases.

use crate::model::directory::{ProjectUid, UserUid};
use crate::repo::RepoError;
use crate::resource::ResourceNameError;
use thiserror::Error;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to get sheet uid from `{sheet}`: {source}")]
    InvalidSheetName {
        sheet: String,
        #[source]
        source: ResourceNameError,
    },
    #[error("sheet `{0}` not found")]
    SheetNotFound(String),
    #[error("project {0} not found")]
    ProjectNotFound(ProjectUid),
    #[error("release creator {0} not found")]
    CreatorNotFound(UserUid),
    #[error("failed to {context}: {source}")]
    Repo {
        context: String,
        #[source]
        source: RepoError,
    },
}

impl ConvertError {
    pub(crate) fn repo(context: impl Into<String>, source: RepoError) -> Self {
        Self::Repo {
            context: context.into(),
            source,
        }
    }
}
