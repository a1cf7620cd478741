//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docone_core::config::ViewerConfig;
use docone_core::types::{DocumentId, LinkId};
use docone_entity::document::Document;
use docone_entity::link::ShareableLink;
use docone_service::viewer::{Admission, LinkPrompt};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Document summary for owners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: DocumentId,
    pub title: String,
    pub original_filename: String,
    pub file_type: String,
    pub file_size: i64,
    /// Whether viewers see a converted PDF rather than the upload itself.
    pub converted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            converted: document.has_converted_copy(),
            id: document.id,
            title: document.title,
            original_filename: document.original_filename,
            file_type: document.file_type,
            file_size: document.file_size,
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }
}

/// Link details for owners. The password hash is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkResponse {
    pub id: LinkId,
    pub document_id: DocumentId,
    pub link_code: String,
    /// Public URL to share.
    pub url: String,
    pub name: Option<String>,
    pub has_password: bool,
    pub require_email: bool,
    pub is_active: bool,
    /// Whether the link currently admits new viewers.
    pub is_valid: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_views: Option<i32>,
    pub view_count: i32,
    pub remaining_views: Option<i32>,
    pub allow_download: bool,
    pub custom_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_viewed_at: Option<DateTime<Utc>>,
}

impl LinkResponse {
    /// Build a response with the public URL for the link.
    pub fn new(link: ShareableLink, viewer: &ViewerConfig) -> Self {
        Self {
            url: viewer.link_url(&link.link_code),
            has_password: link.requires_password(),
            is_valid: link.is_valid(),
            remaining_views: link.remaining_views(),
            id: link.id,
            document_id: link.document_id,
            link_code: link.link_code,
            name: link.name,
            require_email: link.require_email,
            is_active: link.is_active,
            expires_at: link.expires_at,
            max_views: link.max_views,
            view_count: link.view_count,
            allow_download: link.allow_download,
            custom_message: link.custom_message,
            created_at: link.created_at,
            last_viewed_at: link.last_viewed_at,
        }
    }
}

/// Which gate a prompt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    Password,
    Email,
}

/// Data for rendering a gate page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatePromptResponse {
    pub gate: GateKind,
    pub link_code: String,
    pub name: Option<String>,
    pub custom_message: Option<String>,
    pub document_title: String,
    /// Where the gate form is submitted.
    pub submit_url: String,
}

impl GatePromptResponse {
    /// Build the prompt for a gate.
    pub fn new(gate: GateKind, prompt: LinkPrompt) -> Self {
        let suffix = match gate {
            GateKind::Password => "password",
            GateKind::Email => "email",
        };
        Self {
            gate,
            submit_url: format!("/v/{}/{suffix}", prompt.link_code),
            link_code: prompt.link_code,
            name: prompt.name,
            custom_message: prompt.custom_message,
            document_title: prompt.document_title,
        }
    }
}

/// Data for rendering the document viewer page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerPageResponse {
    pub link_code: String,
    pub name: Option<String>,
    pub custom_message: Option<String>,
    pub document_title: String,
    pub original_filename: String,
    /// Inline PDF stream.
    pub document_url: String,
    /// Attachment download, when the link allows it.
    pub download_url: Option<String>,
    /// Analytics session to report heartbeats against.
    pub tracking_session_id: String,
    pub viewer_email: Option<String>,
}

impl From<Admission> for ViewerPageResponse {
    fn from(admission: Admission) -> Self {
        let code = admission.link.link_code;
        Self {
            document_url: format!("/v/{code}/document.pdf"),
            download_url: admission
                .link
                .allow_download
                .then(|| format!("/v/{code}/download")),
            name: admission.link.name,
            custom_message: admission.link.custom_message,
            document_title: admission.document.title,
            original_filename: admission.document.original_filename,
            tracking_session_id: admission.session_id,
            viewer_email: admission.viewer_email,
            link_code: code,
        }
    }
}

/// A newly started analytics session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStartedResponse {
    pub session_id: String,
}

/// Acknowledgement of a tracking call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackStatusResponse {
    pub status: String,
}

impl TrackStatusResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Service health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` when every dependency responds, `degraded` otherwise.
    pub status: String,
    pub version: String,
    pub database: String,
    pub storage_backend: String,
    pub cache: String,
    pub files: String,
}
