//! Email capture model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docone_core::types::{CaptureId, LinkId};

/// An email submitted at a link's email gate. The ledger is append-only:
/// repeat submissions create new entries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CapturedEmail {
    pub id: CaptureId,
    pub link_id: LinkId,
    pub email: String,
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// Set once the viewer who submitted the email was actually admitted.
    pub viewed_document: bool,
    pub captured_at: DateTime<Utc>,
}

/// Data required to record a capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCapture {
    pub link_id: LinkId,
    pub email: String,
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl CapturedEmail {
    /// Build a fresh ledger entry.
    pub fn record(new: NewCapture, now: DateTime<Utc>) -> Self {
        Self {
            id: CaptureId::new(),
            link_id: new.link_id,
            email: new.email,
            full_name: new.full_name,
            company: new.company,
            ip_address: new.ip_address,
            user_agent: new.user_agent,
            viewed_document: false,
            captured_at: now,
        }
    }
}
