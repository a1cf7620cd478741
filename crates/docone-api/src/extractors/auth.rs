//! Owner authentication from the `Authorization: Bearer` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use docone_core::error::AppError;
use docone_service::RequestContext;

use crate::error::ApiError;
use crate::extractors::client::ClientInfo;
use crate::state::AppState;

/// A request carrying a valid owner token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::unauthorized("A bearer owner token is required"))?;

        let claims = state.jwt_decoder.decode(bearer.token())?;
        let ip_address = ClientInfo::from_parts(parts).ip_address;
        Ok(Self(RequestContext::new(claims.user_id(), ip_address)))
    }
}
