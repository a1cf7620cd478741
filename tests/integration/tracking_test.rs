//! Integration tests for viewing-session tracking and the health probe.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use helpers::{Browser, TestApp};
use serde_json::{Value, json};

/// Opens a fresh link in a new browser and returns (token, link, session id).
async fn admitted_session(app: &TestApp) -> (String, Value, String) {
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app.create_link(&token, &document_id, json!({})).await;

    let mut browser = Browser::new(app);
    let response = browser
        .get(&format!("/v/{}", link["link_code"].as_str().unwrap()))
        .await;
    let session_id = response.data()["tracking_session_id"]
        .as_str()
        .unwrap()
        .to_string();
    (token, link, session_id)
}

async fn link_stats(app: &TestApp, token: &str, link: &Value) -> Value {
    let response = app
        .request(
            "GET",
            &format!("/api/links/{}/stats", link["id"].as_str().unwrap()),
            None,
            Some(token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    response.data().clone()
}

#[tokio::test]
async fn test_heartbeats_merge_progress() {
    let app = TestApp::new().await;
    let (token, link, session_id) = admitted_session(&app).await;

    for body in [
        json!({"session_id": session_id, "current_page": 3, "pages_viewed": [1, 2, 3], "duration_seconds": 40}),
        json!({"session_id": session_id, "current_page": 2, "pages_viewed": [2, 5], "duration_seconds": 25}),
    ] {
        let response = app.request("POST", "/api/track/view", Some(body), None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["status"], "success");
    }

    let stats = link_stats(&app, &token, &link).await;
    assert_eq!(stats["total_views"], 1);
    assert_eq!(stats["avg_duration"], 40);
    let view = &stats["views"][0];
    assert_eq!(view["current_page"], 2);
    assert_eq!(view["max_page_reached"], 3);
    assert_eq!(view["pages_viewed"], json!([1, 2, 3, 5]));
    assert_eq!(view["total_page_views"], 4);
    assert!(view["ended_at"].is_null());
}

#[tokio::test]
async fn test_final_heartbeat_ends_session() {
    let app = TestApp::new().await;
    let (token, link, session_id) = admitted_session(&app).await;

    let response = app
        .request(
            "POST",
            "/api/track/view",
            Some(json!({"session_id": session_id, "duration_seconds": 12, "is_final": true})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let stats = link_stats(&app, &token, &link).await;
    let ended_at = stats["views"][0]["ended_at"].clone();
    assert!(ended_at.is_string());

    let response = app
        .request("POST", "/api/track/end", Some(json!({"session_id": session_id})), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let stats = link_stats(&app, &token, &link).await;
    assert_eq!(stats["views"][0]["ended_at"], ended_at);
}

#[tokio::test]
async fn test_beacon_form_payload() {
    let app = TestApp::new().await;
    let (token, link, session_id) = admitted_session(&app).await;

    let data = json!({"session_id": session_id, "current_page": 4, "is_final": true}).to_string();
    let encoded: String = data
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() {
                (b as char).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect();

    let request = Request::builder()
        .method("POST")
        .uri("/api/track/view")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("data={encoded}")))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::OK);

    let stats = link_stats(&app, &token, &link).await;
    assert_eq!(stats["views"][0]["current_page"], 4);
    assert!(stats["views"][0]["ended_at"].is_string());
}

#[tokio::test]
async fn test_unknown_or_missing_session() {
    let app = TestApp::new().await;

    let response = app
        .request("POST", "/api/track/view", Some(json!({"current_page": 1})), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "POST",
            "/api/track/view",
            Some(json!({"session_id": "missing", "current_page": 1})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("POST", "/api/track/end", Some(json!({"session_id": "missing"})), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_explicit_session_start() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app.create_link(&token, &document_id, json!({})).await;

    let response = app
        .request("POST", "/api/track/start", Some(json!({})), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "POST",
            "/api/track/start",
            Some(json!({"link_id": "00000000-0000-0000-0000-000000000000"})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(
            "POST",
            "/api/track/start",
            Some(json!({"link_id": link["id"], "viewer_email": "grace@example.com"})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["session_id"].is_string());

    let stats = link_stats(&app, &token, &link).await;
    assert_eq!(stats["total_views"], 1);
    assert_eq!(stats["unique_viewers"], 1);

    let response = app
        .request(
            "GET",
            &format!("/api/links/{}", link["id"].as_str().unwrap()),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.data()["view_count"], 0);
}

#[tokio::test]
async fn test_document_stats_span_links() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;

    for _ in 0..2 {
        let link = app.create_link(&token, &document_id, json!({})).await;
        let mut browser = Browser::new(&app);
        browser
            .get(&format!("/v/{}", link["link_code"].as_str().unwrap()))
            .await;
    }

    let response = app
        .request(
            "GET",
            &format!("/api/documents/{document_id}/stats"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["total_views"], 2);
    assert_eq!(response.data()["unique_viewers"], 0);
    assert_eq!(response.data()["avg_duration"], 0);

    let (_, intruder) = app.new_owner();
    let response = app
        .request(
            "GET",
            &format!("/api/documents/{document_id}/stats"),
            None,
            Some(&intruder),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["status"], "ok");
    assert_eq!(data["database"], "ok");
    assert_eq!(data["cache"], "ok");
    assert_eq!(data["files"], "ok");
    assert_eq!(data["storage_backend"], "memory");
}
