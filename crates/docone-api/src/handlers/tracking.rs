//! Viewing-session tracking endpoints called by the viewer page.

use axum::Json;
use axum::extract::State;

use docone_core::error::AppError;
use docone_core::types::LinkId;
use docone_service::analytics::SessionOrigin;

use crate::dto::request::{TrackEndRequest, TrackStartRequest, TrackViewRequest};
use crate::dto::response::{SessionStartedResponse, TrackStatusResponse};
use crate::error::ApiResult;
use crate::extractors::{ClientInfo, TrackPayload};
use crate::state::AppState;

/// POST /api/track/start
pub async fn track_start(
    State(state): State<AppState>,
    client: ClientInfo,
    TrackPayload(request): TrackPayload<TrackStartRequest>,
) -> ApiResult<Json<SessionStartedResponse>> {
    let link_id = request
        .link_id
        .map(LinkId::from_uuid)
        .ok_or_else(|| AppError::validation("Link ID required"))?;

    state
        .links
        .find(link_id)
        .await?
        .ok_or_else(|| AppError::not_found("Link not found"))?;

    let session_id = state
        .tracker
        .start_session(
            link_id,
            SessionOrigin {
                viewer_email: request
                    .viewer_email
                    .map(|e| e.trim().to_string())
                    .filter(|e| !e.is_empty()),
                viewer_ip: client.ip_address,
                viewer_user_agent: client.user_agent,
            },
        )
        .await?;

    Ok(Json(SessionStartedResponse { session_id }))
}

/// POST /api/track/view
pub async fn track_view(
    State(state): State<AppState>,
    TrackPayload(request): TrackPayload<TrackViewRequest>,
) -> ApiResult<Json<TrackStatusResponse>> {
    let session_id = request.require_session()?;

    let updated = state
        .tracker
        .update_session(session_id, &request.heartbeat())
        .await?;

    if request.is_final {
        state.tracker.end_session(session_id).await?;
    }

    if updated {
        Ok(Json(TrackStatusResponse::success()))
    } else {
        Err(AppError::not_found("Session not found").into())
    }
}

/// POST /api/track/end
pub async fn track_end(
    State(state): State<AppState>,
    TrackPayload(request): TrackPayload<TrackEndRequest>,
) -> ApiResult<Json<TrackStatusResponse>> {
    let session_id = request.require_session()?;

    if state.tracker.end_session(session_id).await? {
        Ok(Json(TrackStatusResponse::success()))
    } else {
        Err(AppError::not_found("Session not found").into())
    }
}
