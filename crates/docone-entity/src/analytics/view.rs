//! Document viewing session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docone_core::types::{LinkId, ViewId};

/// Lifecycle state of a viewing session.
///
/// Sessions are persisted directly in the `Active` state; there is no
/// stored "new" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Receiving heartbeats.
    Active,
    /// Finalized by a terminal heartbeat.
    Ended,
}

/// One granted viewing session.
///
/// Invariants: `max_page_reached >= current_page` and
/// `total_page_views == pages_viewed.len()` with `pages_viewed` sorted and
/// free of duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentView {
    /// Row identifier.
    pub id: ViewId,
    /// The link through which access was granted.
    pub link_id: LinkId,
    /// Opaque correlation handle used by heartbeats.
    pub session_id: String,
    /// Email captured by the email gate, if any.
    pub viewer_email: Option<String>,
    /// Viewer IP address.
    pub viewer_ip: Option<String>,
    /// Viewer User-Agent.
    pub viewer_user_agent: Option<String>,
    /// Session start.
    pub started_at: DateTime<Utc>,
    /// Session end, set once by the terminal heartbeat.
    pub ended_at: Option<DateTime<Utc>>,
    /// Viewing time reported by the client.
    pub duration_seconds: Option<i32>,
    /// Page currently displayed.
    pub current_page: i32,
    /// Highest page displayed.
    pub max_page_reached: i32,
    /// Distinct page numbers visited, ascending.
    pub pages_viewed: Vec<i32>,
    /// Number of distinct pages visited.
    pub total_page_views: i32,
}

impl DocumentView {
    /// Build the row for a freshly granted session.
    pub fn start(new: NewViewSession, now: DateTime<Utc>) -> Self {
        Self {
            id: ViewId::new(),
            link_id: new.link_id,
            session_id: new.session_id,
            viewer_email: new.viewer_email,
            viewer_ip: new.viewer_ip,
            viewer_user_agent: new.viewer_user_agent,
            started_at: now,
            ended_at: None,
            duration_seconds: None,
            current_page: 1,
            max_page_reached: 1,
            pages_viewed: Vec::new(),
            total_page_views: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        if self.ended_at.is_some() {
            SessionState::Ended
        } else {
            SessionState::Active
        }
    }

    /// Apply a heartbeat.
    ///
    /// The current page is last-write-wins while the page high-water mark,
    /// the visited-page set, and the reported duration only grow, so
    /// heartbeats arriving out of order converge to the same row.
    pub fn apply_heartbeat(&mut self, heartbeat: &Heartbeat) {
        if let Some(page) = heartbeat.current_page {
            self.current_page = page;
            self.max_page_reached = self.max_page_reached.max(page);
        }
        if let Some(pages) = &heartbeat.pages_viewed {
            self.pages_viewed.extend_from_slice(pages);
            self.pages_viewed.sort_unstable();
            self.pages_viewed.dedup();
            self.total_page_views = self.pages_viewed.len() as i32;
        }
        if let Some(duration) = heartbeat.duration_seconds {
            self.duration_seconds = Some(self.duration_seconds.map_or(duration, |d| d.max(duration)));
        }
    }

    /// Mark the session ended. Returns `false` if it had already ended,
    /// in which case the original end time is kept.
    pub fn end(&mut self, now: DateTime<Utc>) -> bool {
        if self.ended_at.is_some() {
            return false;
        }
        self.ended_at = Some(now);
        true
    }
}

/// Data required to open a viewing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewViewSession {
    /// Link through which access was granted.
    pub link_id: LinkId,
    /// Freshly generated session token.
    pub session_id: String,
    /// Email from the email gate.
    pub viewer_email: Option<String>,
    /// Viewer IP address.
    pub viewer_ip: Option<String>,
    /// Viewer User-Agent.
    pub viewer_user_agent: Option<String>,
}

/// A partial progress update for a viewing session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    /// Page currently displayed.
    pub current_page: Option<i32>,
    /// Pages visited since the session started.
    pub pages_viewed: Option<Vec<i32>>,
    /// Elapsed viewing time reported by the client.
    pub duration_seconds: Option<i32>,
}
