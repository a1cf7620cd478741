//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use docone_core::error::{AppError, ErrorKind};
use docone_service::DenyReason;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Error returned by handlers and extractors.
#[derive(Debug)]
pub enum ApiError {
    /// A failed operation.
    App(AppError),
    /// A viewer was refused access to a link.
    Denied(DenyReason),
}

/// Handler result alias.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<DenyReason> for ApiError {
    fn from(reason: DenyReason) -> Self {
        Self::Denied(reason)
    }
}

impl ApiError {
    /// HTTP status for an error kind.
    pub fn status_for(kind: ErrorKind) -> StatusCode {
        match kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::ExternalService => StatusCode::BAD_GATEWAY,
            ErrorKind::Database
            | ErrorKind::Cache
            | ErrorKind::Storage
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Denied(reason) => {
                let status = if reason.is_not_found() {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::FORBIDDEN
                };
                let body = ApiErrorResponse {
                    error: reason.code().to_string(),
                    message: reason.message().to_string(),
                };
                (status, Json(body)).into_response()
            }
            Self::App(err) => {
                let status = Self::status_for(err.kind);
                let message = match err.kind {
                    ErrorKind::ExternalService => {
                        tracing::warn!(error = %err, "External collaborator failed");
                        err.message.clone()
                    }
                    kind if kind.is_fault() => {
                        tracing::error!(error = %err, source = ?err.source, "Internal server error");
                        "An internal error occurred".to_string()
                    }
                    _ => err.message.clone(),
                };
                let body = ApiErrorResponse {
                    error: err.kind.to_string(),
                    message,
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
