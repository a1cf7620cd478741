//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use docone_api::AppState;
use docone_auth::jwt::JwtEncoder;
use docone_cache::CacheManager;
use docone_core::config::AppConfig;
use docone_core::types::UserId;
use docone_database::Storage;

/// Test application context backed by the in-memory store and cache.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for direct service access
    pub state: AppState,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application with conversion disabled.
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.provider = "memory".to_string();
        config.cache.provider = "memory".to_string();
        config.storage.conversion.enabled = false;
        config.storage.upload_root = std::env::temp_dir()
            .join(format!("docone-it-{}", Uuid::new_v4()))
            .to_string_lossy()
            .into_owned();

        let storage = Storage::from_config(&config.database)
            .await
            .expect("Failed to init storage");
        let cache = Arc::new(
            CacheManager::new(&config.cache)
                .await
                .expect("Failed to init cache"),
        );

        let state = AppState::build(config.clone(), storage, cache)
            .await
            .expect("Failed to build state");
        let router = docone_api::build_app(state.clone());

        Self {
            router,
            state,
            config,
        }
    }

    /// A bearer token for a fresh owner.
    pub fn new_owner(&self) -> (UserId, String) {
        let user_id = UserId::new();
        let (token, _) = JwtEncoder::new(&self.config.auth)
            .issue(user_id)
            .expect("Failed to issue token");
        (user_id, token)
    }

    /// Make a JSON request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        self.send(req.body(Body::from(body_str)).expect("Failed to build request"))
            .await
    }

    /// Send a prepared request
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body")
            .to_vec();
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            bytes,
        }
    }

    /// Upload a file through the multipart endpoint
    pub async fn upload(&self, token: &str, filename: &str, content: &[u8]) -> TestResponse {
        let boundary = "docone-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri("/api/documents")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Upload a PDF and return its document id
    pub async fn upload_pdf(&self, token: &str) -> String {
        let response = self.upload(token, "Pitch Deck.pdf", PDF_BYTES).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data()["id"].as_str().expect("document id").to_string()
    }

    /// Create a link for a document and return its JSON
    pub async fn create_link(&self, token: &str, document_id: &str, settings: Value) -> Value {
        let response = self
            .request(
                "POST",
                &format!("/api/documents/{document_id}/links"),
                Some(settings),
                Some(token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data().clone()
    }
}

/// Bytes served as the test document.
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n% docone test document\n%%EOF\n";

/// A browser holding the viewer cookie between requests.
pub struct Browser<'a> {
    app: &'a TestApp,
    cookie: Option<String>,
}

impl<'a> Browser<'a> {
    pub fn new(app: &'a TestApp) -> Self {
        Self { app, cookie: None }
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.call("GET", path, None).await
    }

    pub async fn post(&mut self, path: &str, body: Value) -> TestResponse {
        self.call("POST", path, Some(body)).await
    }

    async fn call(&mut self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = &self.cookie {
            req = req.header(header::COOKIE, cookie.clone());
        }
        let body = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let response = self
            .app
            .send(req.body(Body::from(body)).expect("Failed to build request"))
            .await;

        if let Some(set_cookie) = response
            .headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default();
            self.cookie = Some(pair.to_string());
        }
        response
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` when not JSON
    pub body: Value,
    /// Raw body
    pub bytes: Vec<u8>,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The redirect target
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}
