//! Gate progress stored in the viewer's browser session.

use serde::{Deserialize, Serialize};

use docone_core::types::CaptureId;

/// What a single browser session has already satisfied for one link.
///
/// Holding this state never bypasses validity: the link is re-validated
/// on every access regardless of what is recorded here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateState {
    /// The link password was verified.
    pub password_verified: bool,
    /// Email submitted at the email gate.
    pub captured_email: Option<String>,
    /// Ledger entry created by that submission.
    pub capture_id: Option<CaptureId>,
    /// Viewing session opened for this browser session.
    pub tracking_session_id: Option<String>,
}

impl GateState {
    /// Whether the password gate is satisfied for a link that may or may
    /// not require a password.
    pub fn password_satisfied(&self, requires_password: bool) -> bool {
        !requires_password || self.password_verified
    }

    /// Whether the email gate is satisfied for a link that may or may not
    /// require an email.
    pub fn email_satisfied(&self, require_email: bool) -> bool {
        !require_email || self.captured_email.is_some()
    }

    /// Whether a view has already been granted in this browser session.
    pub fn has_session(&self) -> bool {
        self.tracking_session_id.is_some()
    }
}
