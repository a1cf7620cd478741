//! Link registry: creation, settings, deletion, and view counting.

use std::sync::Arc;

use tracing::{info, warn};

use docone_auth::password::PasswordHasher;
use docone_auth::token::CodeSource;
use docone_core::error::{AppError, ErrorKind};
use docone_core::result::AppResult;
use docone_core::types::{DocumentId, LinkId};
use docone_database::store::LinkStore;
use docone_entity::link::{CreateLink, LinkChanges, ShareableLink};

use super::settings::{LinkSettings, LinkSettingsPatch};
use crate::context::RequestContext;
use crate::ownership::OwnershipGuard;

/// Attempts at drawing an unused link code before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Owns the lifecycle of shareable links.
#[derive(Debug, Clone)]
pub struct LinkRegistry {
    links: Arc<dyn LinkStore>,
    guard: OwnershipGuard,
    hasher: Arc<PasswordHasher>,
    codes: Arc<dyn CodeSource>,
}

impl LinkRegistry {
    /// Creates a new link registry.
    pub fn new(
        links: Arc<dyn LinkStore>,
        guard: OwnershipGuard,
        hasher: Arc<PasswordHasher>,
        codes: Arc<dyn CodeSource>,
    ) -> Self {
        Self {
            links,
            guard,
            hasher,
            codes,
        }
    }

    /// Create a link for a document the caller owns.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        settings: LinkSettings,
    ) -> AppResult<ShareableLink> {
        settings.validate()?;
        self.guard.document(ctx, document_id).await?;

        let password_hash = settings
            .effective_password()
            .map(|p| self.hasher.hash_password(p))
            .transpose()?;

        let mut data = CreateLink {
            document_id,
            link_code: String::new(),
            name: settings.name,
            password_hash,
            require_email: settings.require_email,
            expires_at: settings.expires_at,
            max_views: settings.max_views,
            allow_download: settings.allow_download,
            custom_message: settings.custom_message,
        };

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            data.link_code = self.codes.next_code();
            match self.links.create_link(&data).await {
                Ok(link) => {
                    info!(
                        user_id = %ctx.user_id,
                        document_id = %document_id,
                        link_id = %link.id,
                        password = link.requires_password(),
                        require_email = link.require_email,
                        "Link created"
                    );
                    return Ok(link);
                }
                Err(e) if e.is(ErrorKind::Conflict) => {
                    warn!(attempt, "Link code collision, drawing a new code");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(format!(
            "No unused link code after {MAX_CODE_ATTEMPTS} attempts"
        )))
    }

    /// Fetch a link the caller owns.
    pub async fn get(&self, ctx: &RequestContext, id: LinkId) -> AppResult<ShareableLink> {
        self.guard.link(ctx, id).await.map(|(link, _)| link)
    }

    /// List a document's links, newest first.
    pub async fn list_for_document(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
    ) -> AppResult<Vec<ShareableLink>> {
        self.guard.document(ctx, document_id).await?;
        self.links.list_links(document_id).await
    }

    /// Apply a partial settings update.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: LinkId,
        patch: LinkSettingsPatch,
    ) -> AppResult<ShareableLink> {
        self.guard.link(ctx, id).await?;
        let changes = patch.resolve(&self.hasher)?;
        let link = self.apply(id, &changes).await?;

        info!(user_id = %ctx.user_id, link_id = %id, "Link settings updated");
        Ok(link)
    }

    /// Turn the link off without deleting it.
    pub async fn deactivate(&self, ctx: &RequestContext, id: LinkId) -> AppResult<ShareableLink> {
        self.guard.link(ctx, id).await?;
        let changes = LinkChanges {
            is_active: Some(false),
            ..Default::default()
        };
        let link = self.apply(id, &changes).await?;

        info!(user_id = %ctx.user_id, link_id = %id, "Link deactivated");
        Ok(link)
    }

    /// Delete a link with its views and captures. Deleting a link that no
    /// longer exists is a no-op.
    pub async fn delete(&self, ctx: &RequestContext, id: LinkId) -> AppResult<()> {
        match self.guard.link(ctx, id).await {
            Ok(_) => {}
            Err(e) if e.is(ErrorKind::NotFound) => return Ok(()),
            Err(e) => return Err(e),
        }

        if self.links.delete_link(id).await? {
            info!(user_id = %ctx.user_id, link_id = %id, "Link deleted");
        }
        Ok(())
    }

    /// Claim a view: atomically bumps `view_count` and stamps
    /// `last_viewed_at`. `None` when the link is gone or can no longer
    /// grant a view (inactive, expired or at its cap).
    pub async fn increment_view(&self, id: LinkId) -> AppResult<Option<ShareableLink>> {
        self.links.increment_view(id).await
    }

    /// Look a link up by its public code.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<ShareableLink>> {
        self.links.find_link_by_code(code).await
    }

    /// Look a link up by id without an ownership check.
    pub async fn find(&self, id: LinkId) -> AppResult<Option<ShareableLink>> {
        self.links.find_link(id).await
    }

    async fn apply(&self, id: LinkId, changes: &LinkChanges) -> AppResult<ShareableLink> {
        self.links
            .update_link(id, changes)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found"))
    }
}
