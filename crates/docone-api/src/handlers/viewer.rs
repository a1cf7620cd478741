//! Anonymous viewer flow: the link page, its gates, and the served file.
//!
//! Every response carries the browser-session cookie jar so a first-time
//! viewer keeps the same gate state on the next request.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use tokio_util::io::ReaderStream;

use docone_core::error::{AppError, ErrorKind};
use docone_core::result::AppResult;
use docone_entity::document::Document;
use docone_service::ViewerOutcome;
use docone_service::viewer::{FileAccess, GateStep, ViewerClient};

use crate::dto::request::{EmailGateRequest, PasswordSubmission};
use crate::dto::response::{ApiResponse, GateKind, GatePromptResponse, ViewerPageResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::ViewerSession;
use crate::state::AppState;

fn link_page(code: &str) -> String {
    format!("/v/{code}")
}

fn gate_page(code: &str, gate: GateKind) -> String {
    match gate {
        GateKind::Password => format!("/v/{code}/password"),
        GateKind::Email => format!("/v/{code}/email"),
    }
}

fn collapse(result: ApiResult<Response>) -> Response {
    result.unwrap_or_else(IntoResponse::into_response)
}

/// Turn a flow outcome into a response: denial, redirect to a gate, or the
/// viewer page.
fn render(code: &str, outcome: AppResult<ViewerOutcome>) -> ApiResult<Response> {
    Ok(match outcome? {
        ViewerOutcome::Denied(reason) => return Err(reason.into()),
        ViewerOutcome::NeedsPassword(_) => {
            Redirect::to(&gate_page(code, GateKind::Password)).into_response()
        }
        ViewerOutcome::NeedsEmail(_) => {
            Redirect::to(&gate_page(code, GateKind::Email)).into_response()
        }
        ViewerOutcome::Granted(admission) => {
            Json(ApiResponse::ok(ViewerPageResponse::from(*admission))).into_response()
        }
    })
}

/// GET /v/{code}
pub async fn open_link(
    State(state): State<AppState>,
    Path(code): Path<String>,
    session: ViewerSession,
) -> (CookieJar, Response) {
    let outcome = state.viewer.open(&code, &session.client).await;
    (session.jar, collapse(render(&code, outcome)))
}

/// GET /v/{code}/password
pub async fn password_gate(
    State(state): State<AppState>,
    Path(code): Path<String>,
    session: ViewerSession,
) -> (CookieJar, Response) {
    let response = match state.viewer.peek(&code, &session.client).await {
        Ok(GateStep::Password(prompt)) => {
            Json(GatePromptResponse::new(GateKind::Password, prompt)).into_response()
        }
        Ok(GateStep::Denied(reason)) => ApiError::from(reason).into_response(),
        Ok(GateStep::Email(_) | GateStep::Open) => Redirect::to(&link_page(&code)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    };
    (session.jar, response)
}

/// POST /v/{code}/password
pub async fn submit_password(
    State(state): State<AppState>,
    Path(code): Path<String>,
    session: ViewerSession,
    Json(body): Json<PasswordSubmission>,
) -> (CookieJar, Response) {
    let outcome = state
        .viewer
        .submit_password(&code, &session.client, &body.password)
        .await;
    (session.jar, collapse(render(&code, outcome)))
}

/// GET /v/{code}/email
pub async fn email_gate(
    State(state): State<AppState>,
    Path(code): Path<String>,
    session: ViewerSession,
) -> (CookieJar, Response) {
    let response = match state.viewer.peek(&code, &session.client).await {
        Ok(GateStep::Email(prompt)) => {
            Json(GatePromptResponse::new(GateKind::Email, prompt)).into_response()
        }
        Ok(GateStep::Password(_)) => {
            Redirect::to(&gate_page(&code, GateKind::Password)).into_response()
        }
        Ok(GateStep::Denied(reason)) => ApiError::from(reason).into_response(),
        Ok(GateStep::Open) => Redirect::to(&link_page(&code)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    };
    (session.jar, response)
}

/// POST /v/{code}/email
pub async fn submit_email(
    State(state): State<AppState>,
    Path(code): Path<String>,
    session: ViewerSession,
    Json(body): Json<EmailGateRequest>,
) -> (CookieJar, Response) {
    let response = match body.into_submission() {
        Ok(submission) => {
            let outcome = state
                .viewer
                .submit_email(&code, &session.client, submission)
                .await;
            collapse(render(&code, outcome))
        }
        Err(e) => ApiError::from(e).into_response(),
    };
    (session.jar, response)
}

/// GET /v/{code}/document.pdf
pub async fn serve_document(
    State(state): State<AppState>,
    Path(code): Path<String>,
    session: ViewerSession,
) -> (CookieJar, Response) {
    let response = stream_file(&state, &code, &session.client, FileAccess::Inline).await;
    (session.jar, collapse(response))
}

/// GET /v/{code}/download
pub async fn download_document(
    State(state): State<AppState>,
    Path(code): Path<String>,
    session: ViewerSession,
) -> (CookieJar, Response) {
    let response = stream_file(&state, &code, &session.client, FileAccess::Download).await;
    (session.jar, collapse(response))
}

async fn stream_file(
    state: &AppState,
    code: &str,
    client: &ViewerClient,
    access: FileAccess,
) -> ApiResult<Response> {
    let (_, document) = state.viewer.authorize_file(code, client, access).await?;
    let (file, len) = state.documents.storage().open(&document.view_path).await?;

    let disposition = match access {
        FileAccess::Inline => "inline",
        FileAccess::Download => "attachment",
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_LENGTH, len)
        .header(
            header::CONTENT_DISPOSITION,
            format!("{disposition}; filename=\"{}\"", served_filename(&document)),
        )
        .header(header::CACHE_CONTROL, "private, no-store")
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to build file response", e).into()
        })
}

/// Name of the served PDF: the uploaded name with a `.pdf` extension,
/// restricted to characters safe inside a quoted header value.
fn served_filename(document: &Document) -> String {
    let stem = std::path::Path::new(&document.original_filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let safe: String = stem
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim();
    if safe.is_empty() {
        "document.pdf".to_string()
    } else {
        format!("{safe}.pdf")
    }
}
