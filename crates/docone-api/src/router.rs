//! Route definitions for the DocOne HTTP API.
//!
//! Owner and tracking routes are mounted under `/api`; the public viewer
//! flow under `/v`.

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    let api_routes = Router::new()
        .merge(document_routes())
        .merge(link_routes())
        .merge(tracking_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .nest("/v", viewer_routes())
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors::build_cors_layer(&state.config.server.cors))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Document upload, listing, deletion, statistics
fn document_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/documents",
            get(handlers::documents::list_documents).post(handlers::documents::upload_document),
        )
        .route(
            "/documents/{id}",
            get(handlers::documents::get_document).delete(handlers::documents::delete_document),
        )
        .route("/documents/{id}/stats", get(handlers::documents::document_stats))
        .route(
            "/documents/{id}/links",
            get(handlers::links::list_links).post(handlers::links::create_link),
        )
}

/// Link settings, lifecycle, statistics, captured emails
fn link_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/links/{id}",
            get(handlers::links::get_link)
                .patch(handlers::links::update_link)
                .delete(handlers::links::delete_link),
        )
        .route("/links/{id}/deactivate", post(handlers::links::deactivate_link))
        .route("/links/{id}/stats", get(handlers::links::link_stats))
        .route("/links/{id}/emails", get(handlers::links::link_captures))
}

/// Viewing-session heartbeats
fn tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/track/start", post(handlers::tracking::track_start))
        .route("/track/view", post(handlers::tracking::track_view))
        .route("/track/end", post(handlers::tracking::track_end))
}

/// Health probe
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Public viewer flow
fn viewer_routes() -> Router<AppState> {
    Router::new()
        .route("/{code}", get(handlers::viewer::open_link))
        .route(
            "/{code}/password",
            get(handlers::viewer::password_gate).post(handlers::viewer::submit_password),
        )
        .route(
            "/{code}/email",
            get(handlers::viewer::email_gate).post(handlers::viewer::submit_email),
        )
        .route("/{code}/document.pdf", get(handlers::viewer::serve_document))
        .route("/{code}/download", get(handlers::viewer::download_document))
}
