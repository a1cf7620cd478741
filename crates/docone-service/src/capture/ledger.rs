//! Append-only record of emails submitted at email gates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use validator::ValidateEmail;

use docone_core::error::AppError;
use docone_core::result::AppResult;
use docone_core::types::{CaptureId, LinkId};
use docone_database::store::CaptureStore;
use docone_entity::capture::{CapturedEmail, NewCapture};

/// What a viewer typed into the email gate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailSubmission {
    pub email: String,
    pub full_name: Option<String>,
    pub company: Option<String>,
}

/// Records captures. Repeat submissions of the same address append new
/// entries.
#[derive(Debug, Clone)]
pub struct EmailCaptureLedger {
    captures: Arc<dyn CaptureStore>,
}

impl EmailCaptureLedger {
    /// Creates a new ledger.
    pub fn new(captures: Arc<dyn CaptureStore>) -> Self {
        Self { captures }
    }

    /// Append a capture for a link.
    pub async fn capture(
        &self,
        link_id: LinkId,
        submission: EmailSubmission,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<CapturedEmail> {
        let email = submission.email.trim().to_string();
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }
        if !email.validate_email() {
            return Err(AppError::validation("Email address is not valid"));
        }

        let capture = self
            .captures
            .create_capture(&NewCapture {
                link_id,
                email,
                full_name: non_blank(submission.full_name),
                company: non_blank(submission.company),
                ip_address,
                user_agent,
            })
            .await?;

        info!(link_id = %link_id, capture_id = %capture.id, "Viewer email captured");
        Ok(capture)
    }

    /// Flag a capture as having led to a granted view.
    pub async fn mark_viewed(&self, id: CaptureId) -> AppResult<bool> {
        self.captures.mark_viewed(id).await
    }

    /// Captures for a link, newest first.
    pub async fn list(&self, link_id: LinkId) -> AppResult<Vec<CapturedEmail>> {
        self.captures.list_captures(link_id).await
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
