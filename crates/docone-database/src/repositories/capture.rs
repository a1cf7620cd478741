//! Captured email repository.

use async_trait::async_trait;
use sqlx::PgPool;

use docone_core::error::{AppError, ErrorKind};
use docone_core::result::AppResult;
use docone_core::types::{CaptureId, LinkId};
use docone_entity::capture::{CapturedEmail, NewCapture};

use super::map_db_error;
use crate::store::CaptureStore;

/// PostgreSQL-backed [`CaptureStore`].
#[derive(Debug, Clone)]
pub struct CaptureRepository {
    pool: PgPool,
}

impl CaptureRepository {
    /// Create a new capture repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaptureStore for CaptureRepository {
    async fn create_capture(&self, data: &NewCapture) -> AppResult<CapturedEmail> {
        sqlx::query_as::<_, CapturedEmail>(
            "INSERT INTO captured_emails (link_id, email, full_name, company, ip_address, \
             user_agent) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.link_id)
        .bind(&data.email)
        .bind(&data.full_name)
        .bind(&data.company)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error("Failed to capture email"))
    }

    async fn mark_viewed(&self, id: CaptureId) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE captured_emails SET viewed_document = TRUE WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to flag capture", e)
                })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_captures(&self, link_id: LinkId) -> AppResult<Vec<CapturedEmail>> {
        sqlx::query_as::<_, CapturedEmail>(
            "SELECT * FROM captured_emails WHERE link_id = $1 ORDER BY captured_at DESC",
        )
        .bind(link_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list captures", e))
    }
}
