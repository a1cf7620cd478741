//! Application builder: wires router, middleware, and state into an Axum app.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tracing::{info, warn};

use docone_cache::CacheManager;
use docone_core::config::AppConfig;
use docone_core::error::{AppError, ErrorKind};
use docone_core::result::AppResult;
use docone_database::Storage;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the DocOne server until Ctrl+C.
pub async fn run_server(config: AppConfig, storage: Storage) -> AppResult<()> {
    info!(
        cache_provider = %config.cache.provider,
        "Initializing cache"
    );
    let cache = Arc::new(CacheManager::new(&config.cache).await?);

    let addr = config.server.bind_address();
    let state = AppState::build(config, storage.clone(), cache).await?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Configuration, format!("Failed to bind {addr}"), e)
    })?;

    info!(address = %addr, backend = storage.backend_name(), "DocOne server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    storage.close().await;
    info!("DocOne server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
