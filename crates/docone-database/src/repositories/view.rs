//! Viewing session repository.

use async_trait::async_trait;
use sqlx::PgPool;

use docone_core::error::{AppError, ErrorKind};
use docone_core::result::AppResult;
use docone_core::types::{DocumentId, LinkId};
use docone_entity::analytics::{DocumentView, Heartbeat, NewViewSession, ViewStats};

use super::map_db_error;
use crate::store::ViewStore;

/// Merges a heartbeat in one statement. `GREATEST` ignores NULL, so absent
/// fields leave the high-water marks alone.
const HEARTBEAT_SQL: &str = "\
UPDATE document_views SET
    current_page = COALESCE($2, current_page),
    max_page_reached = GREATEST(max_page_reached, $2),
    pages_viewed = CASE WHEN $3::INTEGER[] IS NULL THEN pages_viewed ELSE
        ARRAY(SELECT DISTINCT p FROM unnest(pages_viewed || $3::INTEGER[]) AS p ORDER BY p) END,
    total_page_views = CASE WHEN $3::INTEGER[] IS NULL THEN total_page_views ELSE
        (SELECT COUNT(DISTINCT p)::INTEGER FROM unnest(pages_viewed || $3::INTEGER[]) AS p) END,
    duration_seconds = GREATEST(duration_seconds, $4)
WHERE session_id = $1";

const AGGREGATE_COLUMNS: &str = "COUNT(v.id), COUNT(DISTINCT v.viewer_email), \
     COALESCE(FLOOR(AVG(v.duration_seconds) FILTER (WHERE v.duration_seconds > 0)), 0)::BIGINT";

/// PostgreSQL-backed [`ViewStore`].
#[derive(Debug, Clone)]
pub struct ViewRepository {
    pool: PgPool,
}

impl ViewRepository {
    /// Create a new view repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn stats(&self, filter: &str, id: uuid::Uuid) -> AppResult<ViewStats> {
        let (total_views, unique_viewers, avg_duration): (i64, i64, i64) = sqlx::query_as(
            &format!(
                "SELECT {AGGREGATE_COLUMNS} FROM document_views v \
                 JOIN shareable_links l ON l.id = v.link_id WHERE {filter} = $1"
            ),
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to aggregate views", e))?;

        let views = sqlx::query_as::<_, DocumentView>(&format!(
            "SELECT v.* FROM document_views v \
             JOIN shareable_links l ON l.id = v.link_id WHERE {filter} = $1 \
             ORDER BY v.started_at DESC"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list views", e))?;

        Ok(ViewStats {
            total_views,
            unique_viewers,
            avg_duration,
            views,
        })
    }
}

#[async_trait]
impl ViewStore for ViewRepository {
    async fn create_view(&self, data: &NewViewSession) -> AppResult<DocumentView> {
        sqlx::query_as::<_, DocumentView>(
            "INSERT INTO document_views (link_id, session_id, viewer_email, viewer_ip, \
             viewer_user_agent) VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.link_id)
        .bind(&data.session_id)
        .bind(&data.viewer_email)
        .bind(&data.viewer_ip)
        .bind(&data.viewer_user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error("Failed to start viewing session"))
    }

    async fn find_view(&self, session_id: &str) -> AppResult<Option<DocumentView>> {
        sqlx::query_as::<_, DocumentView>("SELECT * FROM document_views WHERE session_id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find viewing session", e)
            })
    }

    async fn apply_heartbeat(&self, session_id: &str, heartbeat: &Heartbeat) -> AppResult<bool> {
        let result = sqlx::query(HEARTBEAT_SQL)
            .bind(session_id)
            .bind(heartbeat.current_page)
            .bind(heartbeat.pages_viewed.as_deref())
            .bind(heartbeat.duration_seconds)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to apply heartbeat", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn end_view(&self, session_id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE document_views SET ended_at = COALESCE(ended_at, NOW()) WHERE session_id = $1",
        )
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to end viewing session", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn link_stats(&self, link_id: LinkId) -> AppResult<ViewStats> {
        self.stats("l.id", link_id.into_uuid()).await
    }

    async fn document_stats(&self, document_id: DocumentId) -> AppResult<ViewStats> {
        self.stats("l.document_id", document_id.into_uuid()).await
    }
}
