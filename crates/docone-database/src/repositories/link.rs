//! Shareable link repository.

use async_trait::async_trait;
use sqlx::PgPool;

use docone_core::error::{AppError, ErrorKind};
use docone_core::result::AppResult;
use docone_core::types::{DocumentId, LinkId};
use docone_entity::link::{CreateLink, LinkChanges, ShareableLink};

use super::map_db_error;
use crate::store::LinkStore;

/// PostgreSQL-backed [`LinkStore`].
#[derive(Debug, Clone)]
pub struct LinkRepository {
    pool: PgPool,
}

impl LinkRepository {
    /// Create a new link repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkStore for LinkRepository {
    async fn create_link(&self, data: &CreateLink) -> AppResult<ShareableLink> {
        sqlx::query_as::<_, ShareableLink>(
            "INSERT INTO shareable_links (document_id, link_code, name, password_hash, \
             require_email, expires_at, max_views, allow_download, custom_message) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(data.document_id)
        .bind(&data.link_code)
        .bind(&data.name)
        .bind(&data.password_hash)
        .bind(data.require_email)
        .bind(data.expires_at)
        .bind(data.max_views)
        .bind(data.allow_download)
        .bind(&data.custom_message)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error("Failed to create link"))
    }

    async fn find_link(&self, id: LinkId) -> AppResult<Option<ShareableLink>> {
        sqlx::query_as::<_, ShareableLink>("SELECT * FROM shareable_links WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find link", e))
    }

    async fn find_link_by_code(&self, code: &str) -> AppResult<Option<ShareableLink>> {
        sqlx::query_as::<_, ShareableLink>("SELECT * FROM shareable_links WHERE link_code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find link by code", e)
            })
    }

    async fn list_links(&self, document_id: DocumentId) -> AppResult<Vec<ShareableLink>> {
        sqlx::query_as::<_, ShareableLink>(
            "SELECT * FROM shareable_links WHERE document_id = $1 ORDER BY created_at DESC",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list links", e))
    }

    async fn update_link(
        &self,
        id: LinkId,
        changes: &LinkChanges,
    ) -> AppResult<Option<ShareableLink>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let current = sqlx::query_as::<_, ShareableLink>(
            "SELECT * FROM shareable_links WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock link", e))?;

        let Some(mut link) = current else {
            return Ok(None);
        };
        changes.apply_to(&mut link);

        // view_count and last_viewed_at are left to increment_view.
        let updated = sqlx::query_as::<_, ShareableLink>(
            "UPDATE shareable_links SET name = $2, password_hash = $3, require_email = $4, \
             is_active = $5, expires_at = $6, max_views = $7, allow_download = $8, \
             custom_message = $9 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&link.name)
        .bind(&link.password_hash)
        .bind(link.require_email)
        .bind(link.is_active)
        .bind(link.expires_at)
        .bind(link.max_views)
        .bind(link.allow_download)
        .bind(&link.custom_message)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error("Failed to update link"))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit link update", e)
        })?;
        Ok(Some(updated))
    }

    async fn delete_link(&self, id: LinkId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM shareable_links WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete link", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment_view(&self, id: LinkId) -> AppResult<Option<ShareableLink>> {
        sqlx::query_as::<_, ShareableLink>(
            "UPDATE shareable_links SET view_count = view_count + 1, last_viewed_at = NOW() \
             WHERE id = $1 AND is_active \
               AND (expires_at IS NULL OR expires_at > NOW()) \
               AND (max_views IS NULL OR view_count < max_views) \
             RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to increment views", e))
    }
}
