//! `TrackPayload` extractor: tracking bodies sent as JSON or as a beacon.
//!
//! `navigator.sendBeacon` on page unload posts form data whose `data`
//! field holds the JSON payload; regular heartbeats post JSON directly.

use axum::extract::{Form, FromRequest, Multipart, Request};
use axum::http::header;
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use docone_core::error::AppError;

use crate::error::ApiError;

/// Deserialized tracking payload.
#[derive(Debug, Clone)]
pub struct TrackPayload<T>(pub T);

#[derive(Debug, Deserialize)]
struct BeaconForm {
    #[serde(default)]
    data: Option<String>,
}

fn parse_json<T: DeserializeOwned>(raw: &[u8]) -> Result<T, ApiError> {
    let raw: &[u8] = if raw.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        raw
    };
    serde_json::from_slice(raw)
        .map_err(|e| AppError::validation(format!("Invalid tracking payload: {e}")).into())
}

impl<S, T> FromRequest<S> for TrackPayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(form) = Form::<BeaconForm>::from_request(req, state)
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            let data = form.data.unwrap_or_default();
            return parse_json(data.as_bytes()).map(Self);
        }

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| AppError::validation(e.body_text()))?
            {
                if field.name() == Some("data") {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(e.body_text()))?;
                    return parse_json(&data).map(Self);
                }
            }
            return parse_json(b"").map(Self);
        }

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            return Ok(Self(value));
        }

        // Beacons sent as a plain string carry the JSON body directly.
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        parse_json(&body).map(Self)
    }
}
