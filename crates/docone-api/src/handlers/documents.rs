//! Document upload, listing, deletion, and statistics handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use bytes::Bytes;

use docone_core::error::AppError;
use docone_entity::analytics::ViewStats;
use docone_service::document::UploadedDocument;

use crate::dto::response::{ApiResponse, DocumentResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::extractors::path::document_id;
use crate::state::AppState;

/// POST /api/documents (multipart: `file`, optional `title`)
pub async fn upload_document(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<DocumentResponse>>)> {
    let mut title: Option<String> = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed upload: {}", e.body_text())))?
    {
        match field.name() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(String::from)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| AppError::validation("No file selected"))?;
                let data = field.bytes().await.map_err(|e| {
                    AppError::validation(format!("Failed to read upload: {}", e.body_text()))
                })?;
                file = Some((filename, data));
            }
            Some("title") => {
                let text = field.text().await.map_err(|e| {
                    AppError::validation(format!("Failed to read title: {}", e.body_text()))
                })?;
                title = Some(text);
            }
            _ => {}
        }
    }

    let (filename, data) = file.ok_or_else(|| AppError::validation("No file provided"))?;
    let document = state
        .documents
        .register(
            &auth,
            UploadedDocument {
                title,
                filename,
                data,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(DocumentResponse::from(document))),
    ))
}

/// GET /api/documents
pub async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<DocumentResponse>>>> {
    let documents = state.documents.list(&auth).await?;
    Ok(Json(ApiResponse::ok(
        documents.into_iter().map(DocumentResponse::from).collect(),
    )))
}

/// GET /api/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<DocumentResponse>>> {
    let document = state.documents.get(&auth, document_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(DocumentResponse::from(document))))
}

/// DELETE /api/documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.documents.delete(&auth, document_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/documents/{id}/stats
pub async fn document_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<ViewStats>>> {
    let document = state.guard.document(&auth, document_id(&id)?).await?;
    let stats = state.tracker.get_document_stats(document.id).await?;
    Ok(Json(ApiResponse::ok(stats)))
}
