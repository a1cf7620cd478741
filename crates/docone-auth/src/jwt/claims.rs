//! Payload of an owner token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use docone_core::types::UserId;

/// Registered claims only; an owner token carries no roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The owner.
    pub sub: UserId,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Claims for `owner`, valid for `ttl` from `now`.
    pub fn for_owner(owner: UserId, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: owner,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.sub
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
