//! Shared domain types.

pub mod id;

pub use id::{CaptureId, DocumentId, LinkId, UserId, ViewId};
