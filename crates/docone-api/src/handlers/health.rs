//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use docone_core::traits::cache::CacheProvider;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

fn label(ok: bool) -> String {
    if ok { "ok" } else { "unavailable" }.to_string()
}

/// GET /api/health
pub async fn health(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database = state.storage.health_check().await.unwrap_or(false);
    let cache = state.cache.ping().await.unwrap_or(false);
    let files = state.documents.storage().health_check().await;

    let healthy = database && cache && files;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::ok(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: label(database),
            storage_backend: state.storage.backend_name().to_string(),
            cache: label(cache),
            files: label(files),
        })),
    )
}
