//! Embedded schema migrations.

use sqlx::PgPool;
use tracing::info;

use docone_core::error::{AppError, ErrorKind};
use docone_core::result::AppResult;

/// Apply every migration under `migrations/` that has not run yet.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, format!("Migration failed: {e}"), e)
        })?;

    info!("Schema is up to date");
    Ok(())
}
