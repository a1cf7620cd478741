//! Document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docone_core::types::{DocumentId, UserId};

/// Extension of the format served to viewers.
pub const VIEW_FORMAT_EXTENSION: &str = "pdf";

/// An uploaded document owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Unique document identifier.
    pub id: DocumentId,
    /// Owner of the document and of every link created for it.
    pub owner_id: UserId,
    /// Display title.
    pub title: String,
    /// Filename as uploaded.
    pub original_filename: String,
    /// Lower-case extension of the uploaded file (`pdf`, `docx`, `pptx`).
    pub file_type: String,
    /// Storage-relative path of the uploaded file.
    pub file_path: String,
    /// Storage-relative path of the file served to viewers.
    pub view_path: String,
    /// Size of the uploaded file in bytes.
    pub file_size: i64,
    /// When the document was registered.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Whether the given user owns this document.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    /// Whether the served file is a conversion artifact distinct from the upload.
    pub fn has_converted_copy(&self) -> bool {
        self.view_path != self.file_path
    }
}

/// Data required to register a new document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    /// Owner.
    pub owner_id: UserId,
    /// Display title.
    pub title: String,
    /// Filename as uploaded.
    pub original_filename: String,
    /// Lower-case extension.
    pub file_type: String,
    /// Storage-relative path of the upload.
    pub file_path: String,
    /// Storage-relative path of the served file.
    pub view_path: String,
    /// Upload size in bytes.
    pub file_size: i64,
}
