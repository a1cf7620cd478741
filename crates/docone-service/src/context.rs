//! The owner on whose behalf a management call runs.

use docone_core::types::UserId;

/// Built by the API from a verified owner token and handed to every
/// management operation, which checks ownership against `user_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: UserId,
    /// Caller address, for audit logs.
    pub ip_address: Option<String>,
}

impl RequestContext {
    pub fn new(user_id: UserId, ip_address: Option<String>) -> Self {
        Self {
            user_id,
            ip_address,
        }
    }

    pub fn for_user(user_id: UserId) -> Self {
        Self::new(user_id, None)
    }
}
