//! Opaque page token codec for offset pagination.
//!
//! # Responsibility
//! - Encode `(limit, offset)` into an opaque, URL-safe token.
//! - Decode tokens back, rejecting anything `encode` could not have produced.
//! - Resolve the effective `(limit, offset)` for one list request.
//!
//! # Invariants
//! - `decode(encode(limit, offset)) == (limit, offset)`.
//! - Offsets are positional; inserts or deletes between pages can shift rows
//!   across page boundaries (no snapshot consistency).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageTokenError {
    #[error("page token is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("page token body is malformed: {0}")]
    Body(#[from] serde_json::Error),
    #[error("page token carries negative {field}: {value}")]
    Negative { field: &'static str, value: i64 },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PageTokenBody {
    limit: i64,
    offset: i64,
}

/// Encodes one pagination cursor.
pub fn encode_page_token(limit: u32, offset: u32) -> String {
    let body = PageTokenBody {
        limit: i64::from(limit),
        offset: i64::from(offset),
    };
    // Serializing two integers cannot fail.
    let json = serde_json::to_vec(&body).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decodes one pagination cursor into `(limit, offset)`.
pub fn decode_page_token(token: &str) -> Result<(u32, u32), PageTokenError> {
    let bytes = URL_SAFE_NO_PAD.decode(token)?;
    let body: PageTokenBody = serde_json::from_slice(&bytes)?;
    let limit = non_negative("limit", body.limit)?;
    let offset = non_negative("offset", body.offset)?;
    Ok((limit, offset))
}

/// Resolves the effective `(limit, offset)` for a list request.
///
/// A non-empty token wins over `page_size`. A resolved limit of zero falls
/// back to `default_limit`, and never resolves below one.
pub fn resolve_limit_and_offset(
    page_token: Option<&str>,
    page_size: u32,
    default_limit: u32,
) -> Result<(u32, u32), PageTokenError> {
    let (limit, offset) = match page_token.filter(|token| !token.is_empty()) {
        Some(token) => decode_page_token(token)?,
        None => (page_size, 0),
    };
    let limit = if limit == 0 { default_limit.max(1) } else { limit };
    Ok((limit, offset))
}

fn non_negative(field: &'static str, value: i64) -> Result<u32, PageTokenError> {
    u32::try_from(value).map_err(|_| PageTokenError::Negative { field, value })
}
