//! Verifying owner tokens.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use docone_core::config::AuthConfig;
use docone_core::error::AppError;
use docone_core::result::AppResult;

use super::claims::Claims;

/// Clock skew tolerated on `exp`, in seconds.
const LEEWAY_SECONDS: u64 = 5;

/// Checks the HS256 signature and expiry of bearer tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    key: DecodingKey,
    rules: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder").finish_non_exhaustive()
    }
}

impl JwtDecoder {
    pub fn new(config: &AuthConfig) -> Self {
        let mut rules = Validation::new(Algorithm::HS256);
        rules.leeway = LEEWAY_SECONDS;
        rules.set_required_spec_claims(&["exp", "sub"]);
        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            rules,
        }
    }

    /// Every failure is `Unauthorized`; the message says which check failed.
    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.key, &self.rules)
            .map(|data| data.claims)
            .map_err(|e| {
                let reason = match e.kind() {
                    JwtErrorKind::ExpiredSignature => "Owner token has expired",
                    JwtErrorKind::InvalidSignature => "Owner token signature is invalid",
                    JwtErrorKind::MissingRequiredClaim(_) => "Owner token lacks required claims",
                    _ => "Owner token is malformed",
                };
                AppError::unauthorized(reason)
            })
    }
}
