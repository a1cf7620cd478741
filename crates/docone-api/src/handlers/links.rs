//! Owner link management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use docone_entity::analytics::ViewStats;
use docone_entity::capture::CapturedEmail;

use crate::dto::request::{CreateLinkRequest, UpdateLinkRequest};
use crate::dto::response::{ApiResponse, LinkResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::extractors::path::{document_id, link_id};
use crate::state::AppState;

/// POST /api/documents/{id}/links
pub async fn create_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<CreateLinkRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<LinkResponse>>)> {
    let settings = request.into_settings()?;
    let link = state
        .links
        .create(&auth, document_id(&id)?, settings)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(LinkResponse::new(link, &state.config.viewer))),
    ))
}

/// GET /api/documents/{id}/links
pub async fn list_links(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<LinkResponse>>>> {
    let links = state
        .links
        .list_for_document(&auth, document_id(&id)?)
        .await?;
    Ok(Json(ApiResponse::ok(
        links
            .into_iter()
            .map(|link| LinkResponse::new(link, &state.config.viewer))
            .collect(),
    )))
}

/// GET /api/links/{id}
pub async fn get_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<LinkResponse>>> {
    let link = state.links.get(&auth, link_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(LinkResponse::new(
        link,
        &state.config.viewer,
    ))))
}

/// PATCH /api/links/{id}
pub async fn update_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateLinkRequest>,
) -> ApiResult<Json<ApiResponse<LinkResponse>>> {
    let patch = request.into_patch()?;
    let link = state.links.update(&auth, link_id(&id)?, patch).await?;
    Ok(Json(ApiResponse::ok(LinkResponse::new(
        link,
        &state.config.viewer,
    ))))
}

/// POST /api/links/{id}/deactivate
pub async fn deactivate_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<LinkResponse>>> {
    let link = state.links.deactivate(&auth, link_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(LinkResponse::new(
        link,
        &state.config.viewer,
    ))))
}

/// DELETE /api/links/{id}
pub async fn delete_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.links.delete(&auth, link_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/links/{id}/stats
pub async fn link_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<ViewStats>>> {
    let (link, _) = state.guard.link(&auth, link_id(&id)?).await?;
    let stats = state.tracker.get_link_stats(link.id).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// GET /api/links/{id}/emails
pub async fn link_captures(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<CapturedEmail>>>> {
    let (link, _) = state.guard.link(&auth, link_id(&id)?).await?;
    let captures = state.ledger.list(link.id).await?;
    Ok(Json(ApiResponse::ok(captures)))
}
