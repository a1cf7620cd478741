//! `ViewerSession` extractor: the anonymous browser session cookie.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use docone_auth::token::TokenGenerator;
use docone_service::ViewerClient;

use crate::extractors::client::ClientInfo;
use crate::state::AppState;

/// Longest cookie value accepted as a viewer token.
const MAX_VIEWER_TOKEN_LEN: usize = 128;

/// A browser session. Issues the cookie on first contact; handlers must
/// return `jar` so the cookie reaches the browser.
#[derive(Debug, Clone)]
pub struct ViewerSession {
    pub client: ViewerClient,
    pub jar: CookieJar,
}

fn acceptable(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_VIEWER_TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

impl FromRequestParts<AppState> for ViewerSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let viewer_config = &state.config.viewer;
        let mut jar = CookieJar::from_headers(&parts.headers);

        let existing = jar
            .get(&viewer_config.cookie_name)
            .map(|c| c.value().to_string())
            .filter(|v| acceptable(v));

        let viewer = match existing {
            Some(token) => token,
            None => {
                let token = TokenGenerator::viewer_token();
                let cookie = Cookie::build((viewer_config.cookie_name.clone(), token.clone()))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .secure(viewer_config.cookie_secure)
                    .build();
                jar = jar.add(cookie);
                token
            }
        };

        let client = ClientInfo::from_parts(parts);
        Ok(Self {
            client: ViewerClient {
                viewer,
                ip_address: client.ip_address,
                user_agent: client.user_agent,
            },
            jar,
        })
    }
}
