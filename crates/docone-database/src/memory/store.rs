//! DashMap-backed implementation of every storage contract.
//!
//! State lives in one process and is lost on restart. Counter increments
//! and heartbeat merges run under the shard lock of the entry they touch,
//! which gives the same per-row atomicity as the PostgreSQL statements.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use docone_core::error::AppError;
use docone_core::result::AppResult;
use docone_core::types::{CaptureId, DocumentId, LinkId, UserId};
use docone_entity::analytics::{DocumentView, Heartbeat, NewViewSession, ViewStats};
use docone_entity::capture::{CapturedEmail, NewCapture};
use docone_entity::document::{CreateDocument, Document};
use docone_entity::link::{CreateLink, LinkChanges, ShareableLink};

use crate::store::{CaptureStore, DocumentStore, LinkStore, ViewStore};

/// Single-process store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: DashMap<DocumentId, Document>,
    links: DashMap<LinkId, ShareableLink>,
    link_codes: DashMap<String, LinkId>,
    views: DashMap<String, DocumentView>,
    captures: DashMap<CaptureId, CapturedEmail>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn remove_link_children(&self, link_id: LinkId) {
        self.views.retain(|_, v| v.link_id != link_id);
        self.captures.retain(|_, c| c.link_id != link_id);
    }

    fn link_ids_of(&self, document_id: DocumentId) -> Vec<LinkId> {
        self.links
            .iter()
            .filter(|l| l.document_id == document_id)
            .map(|l| l.id)
            .collect()
    }

    fn views_matching(&self, predicate: impl Fn(&DocumentView) -> bool) -> Vec<DocumentView> {
        self.views
            .iter()
            .filter(|v| predicate(v.value()))
            .map(|v| v.value().clone())
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_document(&self, data: &CreateDocument) -> AppResult<Document> {
        let now = Utc::now();
        let document = Document {
            id: DocumentId::new(),
            owner_id: data.owner_id,
            title: data.title.clone(),
            original_filename: data.original_filename.clone(),
            file_type: data.file_type.clone(),
            file_path: data.file_path.clone(),
            view_path: data.view_path.clone(),
            file_size: data.file_size,
            created_at: now,
            updated_at: now,
        };
        self.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn find_document(&self, id: DocumentId) -> AppResult<Option<Document>> {
        Ok(self.documents.get(&id).map(|d| d.clone()))
    }

    async fn list_documents(&self, owner_id: UserId) -> AppResult<Vec<Document>> {
        let mut documents: Vec<Document> = self
            .documents
            .iter()
            .filter(|d| d.owner_id == owner_id)
            .map(|d| d.clone())
            .collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    async fn delete_document(&self, id: DocumentId) -> AppResult<bool> {
        if self.documents.remove(&id).is_none() {
            return Ok(false);
        }
        for link_id in self.link_ids_of(id) {
            self.delete_link(link_id).await?;
        }
        Ok(true)
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn create_link(&self, data: &CreateLink) -> AppResult<ShareableLink> {
        if !self.documents.contains_key(&data.document_id) {
            return Err(AppError::not_found("Document does not exist"));
        }

        let link = ShareableLink {
            id: LinkId::new(),
            document_id: data.document_id,
            link_code: data.link_code.clone(),
            name: data.name.clone(),
            password_hash: data.password_hash.clone(),
            require_email: data.require_email,
            is_active: true,
            expires_at: data.expires_at,
            max_views: data.max_views,
            view_count: 0,
            custom_message: data.custom_message.clone(),
            allow_download: data.allow_download,
            created_at: Utc::now(),
            last_viewed_at: None,
        };

        match self.link_codes.entry(data.link_code.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict("Link code already in use")),
            Entry::Vacant(slot) => {
                slot.insert(link.id);
                self.links.insert(link.id, link.clone());
                Ok(link)
            }
        }
    }

    async fn find_link(&self, id: LinkId) -> AppResult<Option<ShareableLink>> {
        Ok(self.links.get(&id).map(|l| l.clone()))
    }

    async fn find_link_by_code(&self, code: &str) -> AppResult<Option<ShareableLink>> {
        let Some(id) = self.link_codes.get(code).map(|id| *id) else {
            return Ok(None);
        };
        self.find_link(id).await
    }

    async fn list_links(&self, document_id: DocumentId) -> AppResult<Vec<ShareableLink>> {
        let mut links: Vec<ShareableLink> = self
            .links
            .iter()
            .filter(|l| l.document_id == document_id)
            .map(|l| l.clone())
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn update_link(
        &self,
        id: LinkId,
        changes: &LinkChanges,
    ) -> AppResult<Option<ShareableLink>> {
        Ok(self.links.get_mut(&id).map(|mut link| {
            changes.apply_to(&mut link);
            link.clone()
        }))
    }

    async fn delete_link(&self, id: LinkId) -> AppResult<bool> {
        let Some((_, link)) = self.links.remove(&id) else {
            return Ok(false);
        };
        self.link_codes.remove(&link.link_code);
        self.remove_link_children(id);
        Ok(true)
    }

    async fn increment_view(&self, id: LinkId) -> AppResult<Option<ShareableLink>> {
        let Some(mut link) = self.links.get_mut(&id) else {
            return Ok(None);
        };
        let now = Utc::now();
        if !link.is_valid_at(now) {
            return Ok(None);
        }
        link.view_count += 1;
        link.last_viewed_at = Some(now);
        Ok(Some(link.clone()))
    }
}

#[async_trait]
impl ViewStore for MemoryStore {
    async fn create_view(&self, data: &NewViewSession) -> AppResult<DocumentView> {
        if !self.links.contains_key(&data.link_id) {
            return Err(AppError::not_found("Link does not exist"));
        }
        match self.views.entry(data.session_id.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict("Session id already in use")),
            Entry::Vacant(slot) => {
                let view = DocumentView::start(data.clone(), Utc::now());
                slot.insert(view.clone());
                Ok(view)
            }
        }
    }

    async fn find_view(&self, session_id: &str) -> AppResult<Option<DocumentView>> {
        Ok(self.views.get(session_id).map(|v| v.clone()))
    }

    async fn apply_heartbeat(&self, session_id: &str, heartbeat: &Heartbeat) -> AppResult<bool> {
        Ok(self
            .views
            .get_mut(session_id)
            .map(|mut view| view.apply_heartbeat(heartbeat))
            .is_some())
    }

    async fn end_view(&self, session_id: &str) -> AppResult<bool> {
        Ok(self
            .views
            .get_mut(session_id)
            .map(|mut view| view.end(Utc::now()))
            .is_some())
    }

    async fn link_stats(&self, link_id: LinkId) -> AppResult<ViewStats> {
        Ok(ViewStats::from_views(
            self.views_matching(|v| v.link_id == link_id),
        ))
    }

    async fn document_stats(&self, document_id: DocumentId) -> AppResult<ViewStats> {
        let link_ids = self.link_ids_of(document_id);
        Ok(ViewStats::from_views(
            self.views_matching(|v| link_ids.contains(&v.link_id)),
        ))
    }
}

#[async_trait]
impl CaptureStore for MemoryStore {
    async fn create_capture(&self, data: &NewCapture) -> AppResult<CapturedEmail> {
        if !self.links.contains_key(&data.link_id) {
            return Err(AppError::not_found("Link does not exist"));
        }
        let capture = CapturedEmail::record(data.clone(), Utc::now());
        self.captures.insert(capture.id, capture.clone());
        Ok(capture)
    }

    async fn mark_viewed(&self, id: CaptureId) -> AppResult<bool> {
        Ok(self
            .captures
            .get_mut(&id)
            .map(|mut c| c.viewed_document = true)
            .is_some())
    }

    async fn list_captures(&self, link_id: LinkId) -> AppResult<Vec<CapturedEmail>> {
        let mut captures: Vec<CapturedEmail> = self
            .captures
            .iter()
            .filter(|c| c.link_id == link_id)
            .map(|c| c.clone())
            .collect();
        captures.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
        Ok(captures)
    }
}
