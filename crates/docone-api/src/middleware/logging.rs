//! Access log for every request.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn};

/// Logs method, path, status, and latency once the response is ready.
///
/// Link codes grant access on their own, so the code segment of viewer
/// paths is masked.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = loggable_path(request.uri().path());
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    if response.status().is_server_error() {
        warn!(%method, %path, status, latency_ms, "Request failed");
    } else {
        info!(%method, %path, status, latency_ms, "Request served");
    }
    response
}

fn loggable_path(path: &str) -> String {
    match path.strip_prefix("/v/") {
        Some(rest) => match rest.split_once('/') {
            Some((_, tail)) => format!("/v/***/{tail}"),
            None => "/v/***".to_string(),
        },
        None => path.to_string(),
    }
}
