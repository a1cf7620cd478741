//! Integration tests for shareable link management.

mod helpers;

use axum::http::StatusCode;
use helpers::{Browser, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_create_link_defaults() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;

    let link = app.create_link(&token, &document_id, json!({})).await;

    let code = link["link_code"].as_str().unwrap();
    assert_eq!(code.len(), 22);
    assert!(
        code.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    );
    assert_eq!(link["document_id"], document_id);
    assert_eq!(link["is_active"], true);
    assert_eq!(link["is_valid"], true);
    assert_eq!(link["has_password"], false);
    assert_eq!(link["require_email"], false);
    assert_eq!(link["allow_download"], false);
    assert_eq!(link["view_count"], 0);
    assert!(link["max_views"].is_null());
    assert!(link["url"].as_str().unwrap().ends_with(&format!("/v/{code}")));
    assert!(link.get("password_hash").is_none());
}

#[tokio::test]
async fn test_create_link_with_settings() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;

    let link = app
        .create_link(
            &token,
            &document_id,
            json!({
                "name": "Investors",
                "password": "hunter2",
                "require_email": true,
                "expires_at": "2099-01-31",
                "max_views": 3,
                "allow_download": true,
                "custom_message": "Thanks for looking"
            }),
        )
        .await;

    assert_eq!(link["name"], "Investors");
    assert_eq!(link["has_password"], true);
    assert_eq!(link["require_email"], true);
    assert_eq!(link["max_views"], 3);
    assert_eq!(link["remaining_views"], 3);
    assert_eq!(link["allow_download"], true);
    assert_eq!(link["custom_message"], "Thanks for looking");
    assert!(link["expires_at"].as_str().unwrap().starts_with("2099-01-31T00:00:00"));
}

#[tokio::test]
async fn test_create_link_rejects_bad_input() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let path = format!("/api/documents/{document_id}/links");

    let response = app
        .request("POST", &path, Some(json!({"max_views": 0})), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request("POST", &path, Some(json!({"expires_at": "next week"})), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_owner_manages_links() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let (_, intruder) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;

    let response = app
        .request(
            "POST",
            &format!("/api/documents/{document_id}/links"),
            Some(json!({})),
            Some(&intruder),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let link = app.create_link(&token, &document_id, json!({})).await;
    let link_path = format!("/api/links/{}", link["id"].as_str().unwrap());

    for (method, path) in [
        ("GET", link_path.clone()),
        ("DELETE", link_path.clone()),
        ("POST", format!("{link_path}/deactivate")),
        ("GET", format!("{link_path}/stats")),
        ("GET", format!("{link_path}/emails")),
    ] {
        let response = app.request(method, &path, None, Some(&intruder)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{method} {path}");
    }
}

#[tokio::test]
async fn test_list_links_for_document() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;

    app.create_link(&token, &document_id, json!({"name": "A"})).await;
    app.create_link(&token, &document_id, json!({"name": "B"})).await;

    let response = app
        .request(
            "GET",
            &format!("/api/documents/{document_id}/links"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let links = response.data().as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_ne!(links[0]["link_code"], links[1]["link_code"]);
}

#[tokio::test]
async fn test_update_link_settings() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app
        .create_link(
            &token,
            &document_id,
            json!({"name": "Board", "max_views": 5, "password": "secret"}),
        )
        .await;
    let path = format!("/api/links/{}", link["id"].as_str().unwrap());

    let response = app
        .request(
            "PATCH",
            &path,
            Some(json!({"max_views": null, "allow_download": true, "password": ""})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let updated = response.data();
    assert!(updated["max_views"].is_null());
    assert_eq!(updated["allow_download"], true);
    assert_eq!(updated["has_password"], false);
    assert_eq!(updated["name"], "Board");
    assert_eq!(updated["link_code"], link["link_code"]);
}

#[tokio::test]
async fn test_deactivate_then_delete() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app.create_link(&token, &document_id, json!({})).await;
    let code = link["link_code"].as_str().unwrap();
    let path = format!("/api/links/{}", link["id"].as_str().unwrap());

    let response = app
        .request("POST", &format!("{path}/deactivate"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["is_active"], false);
    assert_eq!(response.data()["is_valid"], false);

    let mut browser = Browser::new(&app);
    let response = browser.get(&format!("/v/{code}")).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "DEACTIVATED");

    let response = app.request("DELETE", &path, None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.request("GET", &path, None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = browser.get(&format!("/v/{code}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reactivate_through_update() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app.create_link(&token, &document_id, json!({})).await;
    let path = format!("/api/links/{}", link["id"].as_str().unwrap());

    app.request("POST", &format!("{path}/deactivate"), None, Some(&token))
        .await;
    let response = app
        .request("PATCH", &path, Some(json!({"is_active": true})), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["is_active"], true);

    let mut browser = Browser::new(&app);
    let response = browser
        .get(&format!("/v/{}", link["link_code"].as_str().unwrap()))
        .await;
    assert_eq!(response.status, StatusCode::OK);
}
