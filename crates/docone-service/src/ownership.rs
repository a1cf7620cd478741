//! Owner authorization for management operations.

use std::sync::Arc;

use docone_core::error::AppError;
use docone_core::result::AppResult;
use docone_core::types::{DocumentId, LinkId};
use docone_database::store::{DocumentStore, LinkStore};
use docone_entity::document::Document;
use docone_entity::link::ShareableLink;

use crate::context::RequestContext;

/// Resolves documents and links on behalf of an owner, rejecting access to
/// anything the owner does not own.
#[derive(Debug, Clone)]
pub struct OwnershipGuard {
    documents: Arc<dyn DocumentStore>,
    links: Arc<dyn LinkStore>,
}

impl OwnershipGuard {
    /// Creates a new ownership guard.
    pub fn new(documents: Arc<dyn DocumentStore>, links: Arc<dyn LinkStore>) -> Self {
        Self { documents, links }
    }

    /// Load a document the caller owns.
    pub async fn document(&self, ctx: &RequestContext, id: DocumentId) -> AppResult<Document> {
        let document = self
            .documents
            .find_document(id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))?;

        if !document.is_owned_by(ctx.user_id) {
            return Err(AppError::forbidden("You do not own this document"));
        }
        Ok(document)
    }

    /// Load a link whose document the caller owns.
    pub async fn link(
        &self,
        ctx: &RequestContext,
        id: LinkId,
    ) -> AppResult<(ShareableLink, Document)> {
        let link = self
            .links
            .find_link(id)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found"))?;
        let document = self.document(ctx, link.document_id).await?;
        Ok((link, document))
    }
}
