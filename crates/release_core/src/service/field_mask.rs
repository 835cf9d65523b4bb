//! Update mask handling for partial release updates.
//!
//! # Invariants
//! - Only fields listed in `ReleaseField` can ever be patched.
//! - Paths without a matching field are ignored, not rejected.

use log::debug;
use std::collections::BTreeSet;

/// Caller-supplied list of field paths an update may touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMask {
    pub paths: Vec<String>,
}

impl FieldMask {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolves mask paths into the set of updatable release fields.
    pub fn release_fields(&self) -> BTreeSet<ReleaseField> {
        let mut fields = BTreeSet::new();
        for path in &self.paths {
            match ReleaseField::from_path(path) {
                Some(field) => {
                    fields.insert(field);
                }
                None => debug!(
                    "event=update_mask module=release_service status=ignored path={}",
                    path
                ),
            }
        }
        fields
    }
}

/// Release fields that accept updates after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReleaseField {
    Title,
}

impl ReleaseField {
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Title => "title",
        }
    }
}
