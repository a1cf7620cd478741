//! Typed path parameter helpers.

use docone_core::error::AppError;
use docone_core::types::{DocumentId, LinkId};
use uuid::Uuid;

/// Parses a UUID from a path segment.
pub fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s).map_err(|_| AppError::validation(format!("Invalid UUID: {s}")))
}

/// Parses a document id from a path segment.
pub fn document_id(s: &str) -> Result<DocumentId, AppError> {
    parse_uuid(s).map(DocumentId::from_uuid)
}

/// Parses a link id from a path segment.
pub fn link_id(s: &str) -> Result<LinkId, AppError> {
    parse_uuid(s).map(LinkId::from_uuid)
}
