//! # docone-api
//!
//! HTTP API layer for DocOne built on Axum.
//!
//! Owner routes (documents, links, statistics) live under `/api` and require
//! a bearer token. The anonymous viewer flow lives under `/v/{code}` and is
//! keyed by a browser-session cookie. Tracking endpoints receive heartbeats
//! from the viewer page.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
