//! Owner-supplied link settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docone_auth::password::PasswordHasher;
use docone_core::error::AppError;
use docone_core::result::AppResult;
use docone_entity::link::LinkChanges;

/// Settings for a new link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkSettings {
    /// Internal name.
    pub name: Option<String>,
    /// Plaintext password; empty or absent means no password gate.
    pub password: Option<String>,
    /// Require an email before viewing.
    pub require_email: bool,
    /// Expiration deadline.
    pub expires_at: Option<DateTime<Utc>>,
    /// View cap.
    pub max_views: Option<i32>,
    /// Serve the download endpoint.
    pub allow_download: bool,
    /// Message shown before viewing.
    pub custom_message: Option<String>,
}

impl LinkSettings {
    /// Reject settings that cannot describe a usable link.
    pub fn validate(&self) -> AppResult<()> {
        validate_max_views(self.max_views)
    }

    /// The password to hash, if one was actually supplied.
    pub fn effective_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// A partial update of link settings.
///
/// Only the fields listed here are recognized. Nullable settings use a
/// nested `Option`: `Some(None)` clears the value. The password is special:
/// `Some("")` removes the password gate, any other `Some` replaces it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkSettingsPatch {
    pub name: Option<Option<String>>,
    pub require_email: Option<bool>,
    pub is_active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub max_views: Option<Option<i32>>,
    pub allow_download: Option<bool>,
    pub custom_message: Option<Option<String>>,
    pub password: Option<String>,
}

impl LinkSettingsPatch {
    /// Validate the patch and hash any new password.
    pub fn resolve(self, hasher: &PasswordHasher) -> AppResult<LinkChanges> {
        if let Some(max_views) = self.max_views {
            validate_max_views(max_views)?;
        }

        let password_hash = match self.password.as_deref() {
            None => None,
            Some("") => Some(None),
            Some(password) => Some(Some(hasher.hash_password(password)?)),
        };

        Ok(LinkChanges {
            name: self.name,
            require_email: self.require_email,
            is_active: self.is_active,
            expires_at: self.expires_at,
            max_views: self.max_views,
            allow_download: self.allow_download,
            custom_message: self.custom_message,
            password_hash,
        })
    }
}

fn validate_max_views(max_views: Option<i32>) -> AppResult<()> {
    match max_views {
        Some(max) if max < 1 => Err(AppError::validation("max_views must be at least 1")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docone_core::error::ErrorKind;

    #[test]
    fn test_empty_password_clears_gate() {
        let changes = LinkSettingsPatch {
            password: Some(String::new()),
            ..Default::default()
        }
        .resolve(&PasswordHasher::new())
        .unwrap();
        assert_eq!(changes.password_hash, Some(None));
    }

    #[test]
    fn test_new_password_is_hashed() {
        let changes = LinkSettingsPatch {
            password: Some("abc12345".to_string()),
            ..Default::default()
        }
        .resolve(&PasswordHasher::new())
        .unwrap();
        let hash = changes.password_hash.flatten().unwrap();
        assert_ne!(hash, "abc12345");
        assert!(PasswordHasher::new().verify_password("abc12345", &hash).unwrap());
    }

    #[test]
    fn test_absent_password_untouched() {
        let changes = LinkSettingsPatch::default()
            .resolve(&PasswordHasher::new())
            .unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_non_positive_view_cap_rejected() {
        let err = LinkSettingsPatch {
            max_views: Some(Some(0)),
            ..Default::default()
        }
        .resolve(&PasswordHasher::new())
        .unwrap_err();
        assert!(err.is(ErrorKind::Validation));

        let settings = LinkSettings {
            max_views: Some(-3),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_empty_password_on_create_means_none() {
        let settings = LinkSettings {
            password: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(settings.effective_password(), None);
    }
}
