//! Shareable link entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docone_core::types::{DocumentId, LinkId};

/// A sharing configuration for exactly one document.
///
/// A link is valid iff it is active, not past its expiration, and below
/// its view cap. Validity depends on `view_count`, which other requests
/// change concurrently, so callers must re-check it at every access point
/// instead of caching the result.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShareableLink {
    /// Unique link identifier.
    pub id: LinkId,
    /// The shared document.
    pub document_id: DocumentId,
    /// Public URL-safe token identifying the link. Immutable.
    pub link_code: String,
    /// Internal name for organization.
    pub name: Option<String>,
    /// Salted slow hash of the link password; presence enables the password gate.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Whether viewers must submit an email before viewing.
    pub require_email: bool,
    /// Owner-controlled kill switch.
    pub is_active: bool,
    /// Absolute deadline after which the link is permanently invalid.
    pub expires_at: Option<DateTime<Utc>>,
    /// Maximum number of granted views.
    pub max_views: Option<i32>,
    /// Number of granted views so far.
    pub view_count: i32,
    /// Message shown to viewers before the document.
    pub custom_message: Option<String>,
    /// Whether the separate download endpoint serves the file.
    pub allow_download: bool,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
    /// When a view was last granted.
    pub last_viewed_at: Option<DateTime<Utc>>,
}

impl ShareableLink {
    /// Whether the link is valid at the given instant.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now) && !self.view_limit_reached()
    }

    /// Whether the link is valid right now.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Whether the expiration deadline has passed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }

    /// Whether the view cap has been reached.
    pub fn view_limit_reached(&self) -> bool {
        matches!(self.max_views, Some(max) if self.view_count >= max)
    }

    /// Whether the password gate applies.
    pub fn requires_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Remaining views before the cap, if capped.
    pub fn remaining_views(&self) -> Option<i32> {
        self.max_views.map(|max| (max - self.view_count).max(0))
    }
}

/// Data required to persist a new link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLink {
    /// Document being shared.
    pub document_id: DocumentId,
    /// Generated link code.
    pub link_code: String,
    /// Internal name.
    pub name: Option<String>,
    /// Pre-hashed password.
    pub password_hash: Option<String>,
    /// Email gate flag.
    pub require_email: bool,
    /// Expiration deadline.
    pub expires_at: Option<DateTime<Utc>>,
    /// View cap.
    pub max_views: Option<i32>,
    /// Download flag.
    pub allow_download: bool,
    /// Message shown before viewing.
    pub custom_message: Option<String>,
}
