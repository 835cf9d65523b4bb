//! Release file conversion against the content store.
//!
//! # Responsibility
//! - Freeze the current sheet checksum into stored file entries on create.
//! - Attach live statement text and size to file entries on read.
//!
//! # Invariants
//! - Entry order is preserved in both directions.
//! - Stored `sheet_sha256` is copied verbatim on read, never recomputed.
//! - Conversion is all-or-nothing: the first failing entry aborts it.

use crate::model::directory::Sheet;
use crate::model::payload::PayloadFile;
use crate::model::release::ReleaseFile;
use crate::repo::SheetRepository;
use crate::resource::parse_sheet_name;
use crate::service::conversion::{ConvertError, ConvertResult};

/// Converts caller file entries into stored entries.
///
/// Sheets are looked up without loading content; only the checksum is kept.
pub fn files_to_payload<S>(
    store: &S,
    files: &[ReleaseFile],
) -> ConvertResult<Vec<PayloadFile>>
where
    S: SheetRepository + ?Sized,
{
    files
        .iter()
        .map(|file| -> ConvertResult<PayloadFile> {
            let sheet = resolve_sheet(store, &file.sheet, false)?;
            Ok(PayloadFile {
                name: file.name.clone(),
                sheet: file.sheet.clone(),
                sheet_sha256: sheet.sha256,
                file_type: file.file_type,
                version: file.version.clone(),
            })
        })
        .collect()
}

/// Converts stored file entries into caller entries with live content.
pub fn files_from_payload<S>(
    store: &S,
    files: &[PayloadFile],
) -> ConvertResult<Vec<ReleaseFile>>
where
    S: SheetRepository + ?Sized,
{
    files
        .iter()
        .map(|file| -> ConvertResult<ReleaseFile> {
            let sheet = resolve_sheet(store, &file.sheet, true)?;
            Ok(ReleaseFile {
                name: file.name.clone(),
                sheet: file.sheet.clone(),
                sheet_sha256: file.sheet_sha256.clone(),
                file_type: file.file_type,
                version: file.version.clone(),
                statement: sheet.statement.unwrap_or_default(),
                statement_size: sheet.size,
            })
        })
        .collect()
}

fn resolve_sheet<S>(store: &S, sheet_name: &str, load_full: bool) -> ConvertResult<Sheet>
where
    S: SheetRepository + ?Sized,
{
    let (_, sheet_uid) =
        parse_sheet_name(sheet_name).map_err(|source| ConvertError::InvalidSheetName {
            sheet: sheet_name.to_string(),
            source,
        })?;
    store
        .get_sheet(sheet_uid, load_full)
        .map_err(|err| ConvertError::repo(format!("get sheet `{sheet_name}`"), err))?
        .ok_or_else(|| ConvertError::SheetNotFound(sheet_name.to_string()))
}
