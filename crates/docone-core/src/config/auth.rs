//! Owner token settings.

use serde::{Deserialize, Serialize};

/// Bearer tokens accepted by the management API.
///
/// Tokens are minted by the account service; DocOne only verifies them
/// against the shared HMAC secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of tokens minted by the local encoder (tests, tooling).
    pub jwt_access_ttl_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-key-change-in-production".into(),
            jwt_access_ttl_minutes: 60,
        }
    }
}
