//! Request DTOs with validation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use docone_core::error::AppError;
use docone_core::result::AppResult;
use docone_entity::analytics::Heartbeat;
use docone_service::capture::EmailSubmission;
use docone_service::link::{LinkSettings, LinkSettingsPatch};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parse an expiration given as RFC 3339 or as a plain `YYYY-MM-DD` date
/// (midnight UTC). A blank value means no expiration.
pub fn parse_expiration(raw: &str) -> AppResult<Option<DateTime<Utc>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| Some(at.and_utc()))
        .ok_or_else(|| {
            AppError::validation(format!(
                "Invalid expiration '{raw}': expected YYYY-MM-DD or an RFC 3339 timestamp"
            ))
        })
}

fn validation_error(errors: validator::ValidationErrors) -> AppError {
    AppError::validation(format!("Invalid request: {errors}"))
}

/// Create link request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Internal name.
    #[validate(length(max = 255))]
    pub name: Option<String>,
    /// Link password; blank means none.
    #[validate(length(max = 128))]
    pub password: Option<String>,
    /// Require an email before viewing.
    #[serde(default)]
    pub require_email: bool,
    /// Expiration (RFC 3339 or YYYY-MM-DD).
    pub expires_at: Option<String>,
    /// View cap.
    #[validate(range(min = 1, message = "max_views must be at least 1"))]
    pub max_views: Option<i32>,
    /// Serve the download endpoint.
    #[serde(default)]
    pub allow_download: bool,
    /// Message shown before viewing.
    #[validate(length(max = 2000))]
    pub custom_message: Option<String>,
}

impl CreateLinkRequest {
    /// Validate and convert into service settings.
    pub fn into_settings(self) -> AppResult<LinkSettings> {
        self.validate().map_err(validation_error)?;
        let expires_at = match self.expires_at.as_deref() {
            Some(raw) => parse_expiration(raw)?,
            None => None,
        };
        Ok(LinkSettings {
            name: non_blank(self.name),
            password: self.password,
            require_email: self.require_email,
            expires_at,
            max_views: self.max_views,
            allow_download: self.allow_download,
            custom_message: non_blank(self.custom_message),
        })
    }
}

/// Partial link update. Absent fields are left unchanged, `null` clears a
/// nullable setting, and unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 255))]
    pub name: Option<Option<String>>,
    pub require_email: Option<bool>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub expires_at: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub max_views: Option<Option<i32>>,
    pub allow_download: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 2000))]
    pub custom_message: Option<Option<String>>,
    /// New password; an empty string removes the password gate.
    #[validate(length(max = 128))]
    pub password: Option<String>,
}

impl UpdateLinkRequest {
    /// Validate and convert into a service patch.
    pub fn into_patch(self) -> AppResult<LinkSettingsPatch> {
        self.validate().map_err(validation_error)?;
        let expires_at = match self.expires_at {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => Some(parse_expiration(&raw)?),
        };
        Ok(LinkSettingsPatch {
            name: self.name.map(non_blank),
            require_email: self.require_email,
            is_active: self.is_active,
            expires_at,
            max_views: self.max_views,
            allow_download: self.allow_download,
            custom_message: self.custom_message.map(non_blank),
            password: self.password,
        })
    }
}

/// Viewer password submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasswordSubmission {
    #[serde(default)]
    pub password: String,
}

/// Viewer email gate submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EmailGateRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 320, message = "Email address is required"),
        email(message = "Email address is not valid")
    )]
    pub email: String,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    #[validate(length(max = 255))]
    pub company: Option<String>,
}

impl EmailGateRequest {
    /// Validate and convert into a ledger submission.
    pub fn into_submission(mut self) -> AppResult<EmailSubmission> {
        self.email = self.email.trim().to_string();
        self.validate().map_err(validation_error)?;
        Ok(EmailSubmission {
            email: self.email,
            full_name: self.full_name,
            company: self.company,
        })
    }
}

/// Explicit analytics session start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackStartRequest {
    pub link_id: Option<Uuid>,
    pub viewer_email: Option<String>,
}

/// Heartbeat from the viewer page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackViewRequest {
    pub session_id: Option<String>,
    pub current_page: Option<i32>,
    pub pages_viewed: Option<Vec<i32>>,
    pub duration_seconds: Option<i32>,
    /// Final heartbeat sent on page unload; also ends the session.
    #[serde(default)]
    pub is_final: bool,
}

impl TrackViewRequest {
    /// The session id, required on every heartbeat.
    pub fn require_session(&self) -> AppResult<&str> {
        require_session(self.session_id.as_deref())
    }

    /// Progress carried by this heartbeat.
    pub fn heartbeat(&self) -> Heartbeat {
        Heartbeat {
            current_page: self.current_page,
            pages_viewed: self.pages_viewed.clone(),
            duration_seconds: self.duration_seconds,
        }
    }
}

/// Explicit analytics session end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackEndRequest {
    pub session_id: Option<String>,
}

impl TrackEndRequest {
    /// The session id to end.
    pub fn require_session(&self) -> AppResult<&str> {
        require_session(self.session_id.as_deref())
    }
}

fn require_session(session_id: Option<&str>) -> AppResult<&str> {
    session_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Session ID required"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use docone_core::error::ErrorKind;

    #[test]
    fn test_parse_expiration_formats() {
        let date = parse_expiration("2026-03-01").unwrap().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2026, 3, 1));
        assert_eq!(date.hour(), 0);

        let ts = parse_expiration("2026-03-01T12:30:00+02:00").unwrap().unwrap();
        assert_eq!(ts.hour(), 10);

        assert_eq!(parse_expiration("  ").unwrap(), None);
        let err = parse_expiration("next tuesday").unwrap_err();
        assert!(err.is(ErrorKind::Validation));
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let patch: UpdateLinkRequest =
            serde_json::from_str(r#"{"max_views": null, "name": "Board", "unknown": 1}"#).unwrap();
        let patch = patch.into_patch().unwrap();
        assert_eq!(patch.max_views, Some(None));
        assert_eq!(patch.name, Some(Some("Board".to_string())));
        assert_eq!(patch.expires_at, None);
        assert_eq!(patch.custom_message, None);
    }

    #[test]
    fn test_create_rejects_zero_max_views() {
        let request = CreateLinkRequest {
            max_views: Some(0),
            ..Default::default()
        };
        let err = request.into_settings().unwrap_err();
        assert!(err.is(ErrorKind::Validation));
    }

    #[test]
    fn test_create_parses_expiration() {
        let settings = CreateLinkRequest {
            expires_at: Some("2030-01-02".to_string()),
            name: Some("  ".to_string()),
            ..Default::default()
        }
        .into_settings()
        .unwrap();
        assert!(settings.expires_at.is_some());
        assert_eq!(settings.name, None);
    }

    #[test]
    fn test_heartbeat_requires_session() {
        let request = TrackViewRequest::default();
        assert!(request.require_session().unwrap_err().is(ErrorKind::Validation));
    }
}
