//! Resolved setting changes applied to an existing link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::ShareableLink;

/// A set of resolved changes to a link's settings.
///
/// Each field is `None` when untouched. Nullable settings use a nested
/// `Option` so that `Some(None)` clears the value. The password is
/// already hashed here; `Some(None)` removes the password gate.
///
/// `view_count` and `last_viewed_at` are deliberately absent: they are
/// only changed by the atomic view increment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkChanges {
    /// Internal name.
    pub name: Option<Option<String>>,
    /// Email gate flag.
    pub require_email: Option<bool>,
    /// Active flag.
    pub is_active: Option<bool>,
    /// Expiration deadline.
    pub expires_at: Option<Option<DateTime<Utc>>>,
    /// View cap.
    pub max_views: Option<Option<i32>>,
    /// Download flag.
    pub allow_download: Option<bool>,
    /// Message shown before viewing.
    pub custom_message: Option<Option<String>>,
    /// Replacement password hash.
    pub password_hash: Option<Option<String>>,
}

impl LinkChanges {
    /// Whether no field is touched.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the changes to a link in place.
    pub fn apply_to(&self, link: &mut ShareableLink) {
        if let Some(name) = &self.name {
            link.name = name.clone();
        }
        if let Some(require_email) = self.require_email {
            link.require_email = require_email;
        }
        if let Some(is_active) = self.is_active {
            link.is_active = is_active;
        }
        if let Some(expires_at) = self.expires_at {
            link.expires_at = expires_at;
        }
        if let Some(max_views) = self.max_views {
            link.max_views = max_views;
        }
        if let Some(allow_download) = self.allow_download {
            link.allow_download = allow_download;
        }
        if let Some(custom_message) = &self.custom_message {
            link.custom_message = custom_message.clone();
        }
        if let Some(password_hash) = &self.password_hash {
            link.password_hash = password_hash.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::model::tests::sample_link;

    #[test]
    fn test_empty_changes_leave_link_untouched() {
        let mut link = sample_link();
        link.name = Some("Q3 deck".to_string());
        let before = serde_json::to_value(&link).expect("serialize");

        let changes = LinkChanges::default();
        assert!(changes.is_empty());
        changes.apply_to(&mut link);

        assert_eq!(serde_json::to_value(&link).expect("serialize"), before);
    }

    #[test]
    fn test_nested_none_clears_value() {
        let mut link = sample_link();
        link.max_views = Some(3);
        link.password_hash = Some("hash".to_string());

        let changes = LinkChanges {
            max_views: Some(None),
            password_hash: Some(None),
            is_active: Some(false),
            ..Default::default()
        };
        changes.apply_to(&mut link);

        assert_eq!(link.max_views, None);
        assert!(!link.requires_password());
        assert!(!link.is_active);
    }
}
