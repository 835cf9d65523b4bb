//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into release use-case APIs.
//! - Convert between stored records and the external release view.
//! - Keep transport layers decoupled from storage details.

pub mod conversion;
pub mod field_mask;
pub mod file_resolver;
pub mod release_converter;
pub mod release_service;
