//! Integration tests for the anonymous viewer flow.

mod helpers;

use axum::http::{StatusCode, header};
use helpers::{Browser, PDF_BYTES, TestApp};
use serde_json::{Value, json};

async fn link_view_count(app: &TestApp, token: &str, link: &Value) -> i64 {
    let response = app
        .request(
            "GET",
            &format!("/api/links/{}", link["id"].as_str().unwrap()),
            None,
            Some(token),
        )
        .await;
    response.data()["view_count"].as_i64().unwrap()
}

#[tokio::test]
async fn test_open_counts_once_per_browser() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app
        .create_link(&token, &document_id, json!({"custom_message": "Welcome"}))
        .await;
    let code = link["link_code"].as_str().unwrap();

    let mut first = Browser::new(&app);
    let response = first.get(&format!("/v/{code}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers.get(header::SET_COOKIE).is_some());
    let page = response.data();
    assert_eq!(page["document_title"], "Pitch Deck");
    assert_eq!(page["custom_message"], "Welcome");
    assert_eq!(page["document_url"], format!("/v/{code}/document.pdf"));
    assert!(page["download_url"].is_null());
    let session_id = page["tracking_session_id"].as_str().unwrap().to_string();

    let response = first.get(&format!("/v/{code}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["tracking_session_id"], session_id);
    assert_eq!(link_view_count(&app, &token, &link).await, 1);

    let mut second = Browser::new(&app);
    let response = second.get(&format!("/v/{code}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_ne!(response.data()["tracking_session_id"], session_id);
    assert_eq!(link_view_count(&app, &token, &link).await, 2);
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let app = TestApp::new().await;
    let mut browser = Browser::new(&app);

    let response = browser.get("/v/does-not-exist").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_password_gate() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app
        .create_link(&token, &document_id, json!({"password": "hunter2"}))
        .await;
    let code = link["link_code"].as_str().unwrap();
    let mut browser = Browser::new(&app);

    let response = browser.get(&format!("/v/{code}")).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(format!("/v/{code}/password").as_str()));

    let response = browser.get(&format!("/v/{code}/password")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["gate"], "password");
    assert_eq!(response.body["submit_url"], format!("/v/{code}/password"));

    let response = browser
        .post(&format!("/v/{code}/password"), json!({"password": "wrong"}))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "PASSWORD_INCORRECT");
    assert_eq!(link_view_count(&app, &token, &link).await, 0);

    let response = browser
        .post(&format!("/v/{code}/password"), json!({"password": "hunter2"}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.data()["tracking_session_id"].is_string());
    assert_eq!(link_view_count(&app, &token, &link).await, 1);

    let response = browser.get(&format!("/v/{code}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(link_view_count(&app, &token, &link).await, 1);
}

#[tokio::test]
async fn test_password_verification_is_per_browser() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app
        .create_link(&token, &document_id, json!({"password": "hunter2"}))
        .await;
    let code = link["link_code"].as_str().unwrap();

    let mut trusted = Browser::new(&app);
    trusted
        .post(&format!("/v/{code}/password"), json!({"password": "hunter2"}))
        .await;

    let mut stranger = Browser::new(&app);
    let response = stranger.get(&format!("/v/{code}")).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let response = stranger.get(&format!("/v/{code}/document.pdf")).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_password_then_email_gate() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app
        .create_link(
            &token,
            &document_id,
            json!({"password": "hunter2", "require_email": true}),
        )
        .await;
    let code = link["link_code"].as_str().unwrap();
    let mut browser = Browser::new(&app);

    let response = browser.get(&format!("/v/{code}/email")).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(format!("/v/{code}/password").as_str()));

    let response = browser
        .post(&format!("/v/{code}/password"), json!({"password": "hunter2"}))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(format!("/v/{code}/email").as_str()));

    let response = browser.get(&format!("/v/{code}/email")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["gate"], "email");

    let response = browser
        .post(&format!("/v/{code}/email"), json!({"email": "   "}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = browser
        .post(&format!("/v/{code}/email"), json!({"email": "ada at example"}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");

    let response = browser
        .post(
            &format!("/v/{code}/email"),
            json!({"email": " ada@example.com ", "full_name": "Ada", "company": "Engines"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["viewer_email"], "ada@example.com");

    let response = app
        .request(
            "GET",
            &format!("/api/links/{}/emails", link["id"].as_str().unwrap()),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let captures = response.data().as_array().unwrap();
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0]["email"], "ada@example.com");
    assert_eq!(captures[0]["company"], "Engines");
    assert_eq!(captures[0]["viewed_document"], true);

    let response = app
        .request(
            "GET",
            &format!("/api/links/{}/stats", link["id"].as_str().unwrap()),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.data()["total_views"], 1);
    assert_eq!(response.data()["unique_viewers"], 1);
    assert_eq!(response.data()["views"][0]["viewer_email"], "ada@example.com");
}

#[tokio::test]
async fn test_view_limit_spares_admitted_viewers() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app
        .create_link(&token, &document_id, json!({"max_views": 1}))
        .await;
    let code = link["link_code"].as_str().unwrap();

    let mut first = Browser::new(&app);
    assert_eq!(first.get(&format!("/v/{code}")).await.status, StatusCode::OK);

    let mut second = Browser::new(&app);
    let response = second.get(&format!("/v/{code}")).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "VIEW_LIMIT_REACHED");

    let response = first.get(&format!("/v/{code}/document.pdf")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(link_view_count(&app, &token, &link).await, 1);
}

#[tokio::test]
async fn test_expired_link() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app
        .create_link(&token, &document_id, json!({"expires_at": "2000-01-01"}))
        .await;
    assert_eq!(link["is_valid"], false);

    let mut browser = Browser::new(&app);
    let response = browser
        .get(&format!("/v/{}", link["link_code"].as_str().unwrap()))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "EXPIRED");
}

#[tokio::test]
async fn test_document_served_inline_after_admission() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app.create_link(&token, &document_id, json!({})).await;
    let code = link["link_code"].as_str().unwrap();
    let mut browser = Browser::new(&app);

    let response = browser.get(&format!("/v/{code}/document.pdf")).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    browser.get(&format!("/v/{code}")).await;
    let response = browser.get(&format!("/v/{code}/document.pdf")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers.get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = response
        .headers
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("inline"));
    assert_eq!(response.bytes, PDF_BYTES);

    let response = browser.get(&format!("/v/{code}/download")).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_download_when_allowed() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app
        .create_link(&token, &document_id, json!({"allow_download": true}))
        .await;
    let code = link["link_code"].as_str().unwrap();
    let mut browser = Browser::new(&app);

    let response = browser.get(&format!("/v/{code}")).await;
    assert_eq!(response.data()["download_url"], format!("/v/{code}/download"));

    let response = browser.get(&format!("/v/{code}/download")).await;
    assert_eq!(response.status, StatusCode::OK);
    let disposition = response
        .headers
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(disposition, "attachment; filename=\"Pitch Deck.pdf\"");
    assert_eq!(response.bytes, PDF_BYTES);
}

#[tokio::test]
async fn test_deactivation_cuts_off_file_access() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app.create_link(&token, &document_id, json!({})).await;
    let code = link["link_code"].as_str().unwrap();
    let mut browser = Browser::new(&app);
    browser.get(&format!("/v/{code}")).await;

    app.request(
        "POST",
        &format!("/api/links/{}/deactivate", link["id"].as_str().unwrap()),
        None,
        Some(&token),
    )
    .await;

    let response = browser.get(&format!("/v/{code}/document.pdf")).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
