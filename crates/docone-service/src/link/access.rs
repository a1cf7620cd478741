//! Access decisions over link state.
//!
//! Decisions are values, never errors: a denied viewer is an expected,
//! frequent outcome. Checks run in a fixed order and the first failure
//! wins, so an expired password-protected link always reports expiry.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use docone_auth::password::PasswordHasher;
use docone_entity::link::ShareableLink;

/// Why access was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    NotFound,
    Deactivated,
    Expired,
    ViewLimitReached,
    PasswordRequired,
    PasswordIncorrect,
}

impl DenyReason {
    /// Message shown to the viewer.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotFound => "This link does not exist",
            Self::Deactivated => "This link has been deactivated",
            Self::Expired => "This link has expired",
            Self::ViewLimitReached => "This link has reached its view limit",
            Self::PasswordRequired => "A password is required to view this document",
            Self::PasswordIncorrect => "Incorrect password",
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Deactivated => "DEACTIVATED",
            Self::Expired => "EXPIRED",
            Self::ViewLimitReached => "VIEW_LIMIT_REACHED",
            Self::PasswordRequired => "PASSWORD_REQUIRED",
            Self::PasswordIncorrect => "PASSWORD_INCORRECT",
        }
    }

    /// Whether the viewer should be shown a not-found page rather than a
    /// forbidden one.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of an access evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied(DenyReason),
}

impl AccessDecision {
    /// Whether access was granted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// The denial reason, if denied.
    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Self::Allowed => None,
            Self::Denied(reason) => Some(*reason),
        }
    }
}

/// Stateless access decision logic.
#[derive(Debug, Clone)]
pub struct AccessValidator {
    hasher: Arc<PasswordHasher>,
}

impl AccessValidator {
    /// Creates a new access validator.
    pub fn new(hasher: Arc<PasswordHasher>) -> Self {
        Self { hasher }
    }

    /// Evaluate access right now.
    pub fn evaluate(
        &self,
        link: Option<&ShareableLink>,
        supplied_password: Option<&str>,
    ) -> AccessDecision {
        self.evaluate_at(link, supplied_password, Utc::now())
    }

    /// Evaluate access at a given instant: existence, active flag,
    /// expiration, view cap, then password.
    pub fn evaluate_at(
        &self,
        link: Option<&ShareableLink>,
        supplied_password: Option<&str>,
        now: DateTime<Utc>,
    ) -> AccessDecision {
        let link = match Self::check_validity(link, now) {
            Ok(link) => link,
            Err(reason) => return AccessDecision::Denied(reason),
        };

        let Some(hash) = link.password_hash.as_deref() else {
            return AccessDecision::Allowed;
        };
        match supplied_password {
            None | Some("") => AccessDecision::Denied(DenyReason::PasswordRequired),
            Some(password) if self.password_matches(link, hash, password) => {
                AccessDecision::Allowed
            }
            Some(_) => AccessDecision::Denied(DenyReason::PasswordIncorrect),
        }
    }

    /// The first four checks: existence, active flag, expiration, view cap.
    pub fn check_validity(
        link: Option<&ShareableLink>,
        now: DateTime<Utc>,
    ) -> Result<&ShareableLink, DenyReason> {
        let link = Self::check_serving(link, now)?;
        if link.view_limit_reached() {
            return Err(DenyReason::ViewLimitReached);
        }
        Ok(link)
    }

    /// Checks for serving content to a viewer who was already granted a
    /// view: the granted view itself may have reached the cap, so only
    /// existence, the active flag and expiration apply.
    pub fn check_serving(
        link: Option<&ShareableLink>,
        now: DateTime<Utc>,
    ) -> Result<&ShareableLink, DenyReason> {
        let link = link.ok_or(DenyReason::NotFound)?;
        if !link.is_active {
            return Err(DenyReason::Deactivated);
        }
        if link.is_expired_at(now) {
            return Err(DenyReason::Expired);
        }
        Ok(link)
    }

    fn password_matches(&self, link: &ShareableLink, hash: &str, password: &str) -> bool {
        match self.hasher.verify_password(password, hash) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(link_id = %link.id, error = %e, "Stored link password hash is unusable");
                false
            }
        }
    }
}
