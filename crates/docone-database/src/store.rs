//! Storage contracts.
//!
//! Services depend on these traits rather than on a concrete backend so the
//! same flows run against PostgreSQL in production and against
//! [`MemoryStore`](crate::MemoryStore) in tests. Every implementation must
//! provide the same guarantees: unique link codes and session ids reported
//! as [`ErrorKind::Conflict`](docone_core::ErrorKind::Conflict), an atomic
//! view increment, cascading deletes, and single-step heartbeat merges.

use async_trait::async_trait;

use docone_core::result::AppResult;
use docone_core::types::{CaptureId, DocumentId, LinkId, UserId};
use docone_entity::analytics::{DocumentView, Heartbeat, NewViewSession, ViewStats};
use docone_entity::capture::{CapturedEmail, NewCapture};
use docone_entity::document::{CreateDocument, Document};
use docone_entity::link::{CreateLink, LinkChanges, ShareableLink};

/// Document persistence.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a document row.
    async fn create_document(&self, data: &CreateDocument) -> AppResult<Document>;

    /// Find a document by id.
    async fn find_document(&self, id: DocumentId) -> AppResult<Option<Document>>;

    /// List an owner's documents, newest first.
    async fn list_documents(&self, owner_id: UserId) -> AppResult<Vec<Document>>;

    /// Delete a document and, by cascade, its links, views and captures.
    /// Returns whether a row was removed.
    async fn delete_document(&self, id: DocumentId) -> AppResult<bool>;
}

/// Shareable link persistence.
#[async_trait]
pub trait LinkStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a link. A duplicate `link_code` fails with `Conflict`; an
    /// unknown document fails with `NotFound`.
    async fn create_link(&self, data: &CreateLink) -> AppResult<ShareableLink>;

    /// Find a link by id.
    async fn find_link(&self, id: LinkId) -> AppResult<Option<ShareableLink>>;

    /// Find a link by its public code.
    async fn find_link_by_code(&self, code: &str) -> AppResult<Option<ShareableLink>>;

    /// List a document's links, newest first.
    async fn list_links(&self, document_id: DocumentId) -> AppResult<Vec<ShareableLink>>;

    /// Apply setting changes. Returns `None` if the link does not exist.
    async fn update_link(
        &self,
        id: LinkId,
        changes: &LinkChanges,
    ) -> AppResult<Option<ShareableLink>>;

    /// Delete a link and its views and captures. Returns whether a row was removed.
    async fn delete_link(&self, id: LinkId) -> AppResult<bool>;

    /// Atomically add one to `view_count` and stamp `last_viewed_at`, but
    /// only while the link is active, unexpired and under its cap. Returns
    /// the updated link, or `None` if it is missing or no longer admits a
    /// view.
    async fn increment_view(&self, id: LinkId) -> AppResult<Option<ShareableLink>>;
}

/// Viewing session persistence.
#[async_trait]
pub trait ViewStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert an active session. A duplicate `session_id` fails with `Conflict`.
    async fn create_view(&self, data: &NewViewSession) -> AppResult<DocumentView>;

    /// Find a session by its correlation id.
    async fn find_view(&self, session_id: &str) -> AppResult<Option<DocumentView>>;

    /// Merge a heartbeat into a session. Returns `false` for unknown sessions.
    async fn apply_heartbeat(&self, session_id: &str, heartbeat: &Heartbeat) -> AppResult<bool>;

    /// Set `ended_at` if unset. Returns `false` for unknown sessions.
    async fn end_view(&self, session_id: &str) -> AppResult<bool>;

    /// Statistics over one link's sessions.
    async fn link_stats(&self, link_id: LinkId) -> AppResult<ViewStats>;

    /// Statistics over the sessions of every link of a document.
    async fn document_stats(&self, document_id: DocumentId) -> AppResult<ViewStats>;
}

/// Email capture ledger persistence.
#[async_trait]
pub trait CaptureStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append a capture.
    async fn create_capture(&self, data: &NewCapture) -> AppResult<CapturedEmail>;

    /// Flag a capture as having led to a viewing session.
    async fn mark_viewed(&self, id: CaptureId) -> AppResult<bool>;

    /// List a link's captures, newest first.
    async fn list_captures(&self, link_id: LinkId) -> AppResult<Vec<CapturedEmail>>;
}
