//! Viewing session lifecycle and aggregate statistics.
//!
//! A session is created active, receives zero or more heartbeats, and is
//! closed by a terminal heartbeat. Heartbeats for unknown sessions are
//! expected after restarts or deletions and are reported as `false`, not
//! as errors.

use std::sync::Arc;

use tracing::{debug, info, warn};

use docone_auth::token::TokenGenerator;
use docone_core::error::{AppError, ErrorKind};
use docone_core::result::AppResult;
use docone_core::types::{DocumentId, LinkId};
use docone_database::store::ViewStore;
use docone_entity::analytics::{DocumentView, Heartbeat, NewViewSession, ViewStats};

/// Attempts at drawing an unused session id.
const MAX_SESSION_ID_ATTEMPTS: usize = 3;

/// Client details recorded on a viewing session.
#[derive(Debug, Clone, Default)]
pub struct SessionOrigin {
    pub viewer_email: Option<String>,
    pub viewer_ip: Option<String>,
    pub viewer_user_agent: Option<String>,
}

/// Owns viewing sessions.
#[derive(Debug, Clone)]
pub struct AnalyticsTracker {
    views: Arc<dyn ViewStore>,
}

impl AnalyticsTracker {
    /// Creates a new analytics tracker.
    pub fn new(views: Arc<dyn ViewStore>) -> Self {
        Self { views }
    }

    /// Open an active session for a link and return its session id.
    pub async fn start_session(&self, link_id: LinkId, origin: SessionOrigin) -> AppResult<String> {
        let mut data = NewViewSession {
            link_id,
            session_id: String::new(),
            viewer_email: origin.viewer_email,
            viewer_ip: origin.viewer_ip,
            viewer_user_agent: origin.viewer_user_agent,
        };

        for _ in 0..MAX_SESSION_ID_ATTEMPTS {
            data.session_id = TokenGenerator::session_id();
            match self.views.create_view(&data).await {
                Ok(view) => {
                    info!(
                        link_id = %link_id,
                        session_id = %view.session_id,
                        email = view.viewer_email.is_some(),
                        "Viewing session started"
                    );
                    return Ok(view.session_id);
                }
                Err(e) if e.is(ErrorKind::Conflict) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal("Could not allocate a unique session id"))
    }

    /// Merge a heartbeat. Returns `false` if the session is unknown.
    pub async fn update_session(&self, session_id: &str, heartbeat: &Heartbeat) -> AppResult<bool> {
        let found = self.views.apply_heartbeat(session_id, heartbeat).await?;
        if found {
            debug!(
                session_id,
                current_page = ?heartbeat.current_page,
                duration_seconds = ?heartbeat.duration_seconds,
                "Heartbeat applied"
            );
        } else {
            warn!(session_id, "Heartbeat for unknown viewing session");
        }
        Ok(found)
    }

    /// Close a session. Closing twice keeps the first end time and still
    /// returns `true`; unknown sessions return `false`.
    pub async fn end_session(&self, session_id: &str) -> AppResult<bool> {
        let found = self.views.end_view(session_id).await?;
        if found {
            info!(session_id, "Viewing session ended");
        } else {
            warn!(session_id, "End requested for unknown viewing session");
        }
        Ok(found)
    }

    /// Look a session up.
    pub async fn get_session(&self, session_id: &str) -> AppResult<Option<DocumentView>> {
        self.views.find_view(session_id).await
    }

    /// Statistics across every link of a document.
    pub async fn get_document_stats(&self, document_id: DocumentId) -> AppResult<ViewStats> {
        self.views.document_stats(document_id).await
    }

    /// Statistics for one link.
    pub async fn get_link_stats(&self, link_id: LinkId) -> AppResult<ViewStats> {
        self.views.link_stats(link_id).await
    }
}
