//! Anonymous viewer settings.

use serde::{Deserialize, Serialize};

/// The browser-session cookie and the public link URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub cookie_name: String,
    /// Send the cookie over HTTPS only.
    pub cookie_secure: bool,
    /// How long a browser session and its gate progress survive, in seconds.
    pub session_lifetime_seconds: u64,
    /// Base of the URLs handed to owners for sharing.
    pub public_url: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            cookie_name: "docone_viewer".into(),
            cookie_secure: false,
            session_lifetime_seconds: 86_400,
            public_url: "http://localhost:8080".into(),
        }
    }
}

impl ViewerConfig {
    /// The shareable URL of a link code.
    pub fn link_url(&self, link_code: &str) -> String {
        format!("{}/v/{link_code}", self.public_url.trim_end_matches('/'))
    }
}
