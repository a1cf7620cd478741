//! Minting owner tokens.
//!
//! Production tokens come from the account service. The encoder exists for
//! local tooling and tests, and shares the secret the decoder checks.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use docone_core::config::AuthConfig;
use docone_core::error::{AppError, ErrorKind};
use docone_core::result::AppResult;
use docone_core::types::UserId;

use super::claims::Claims;

#[derive(Clone)]
pub struct JwtEncoder {
    key: EncodingKey,
    lifetime: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl JwtEncoder {
    pub fn new(config: &AuthConfig) -> Self {
        let minutes = i64::try_from(config.jwt_access_ttl_minutes).unwrap_or(i64::MAX / 60_000);
        Self {
            key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            lifetime: Duration::minutes(minutes),
        }
    }

    /// A signed HS256 token for `owner` and the instant it expires.
    pub fn issue(&self, owner: UserId) -> AppResult<(String, DateTime<Utc>)> {
        let claims = Claims::for_owner(owner, Utc::now(), self.lifetime);
        let expires_at = claims.expires_at().unwrap_or_else(Utc::now);
        let token = encode(&Header::default(), &claims, &self.key)
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Cannot sign owner token", e))?;
        Ok((token, expires_at))
    }
}
