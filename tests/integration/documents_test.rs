//! Integration tests for document upload, listing, and deletion.

mod helpers;

use axum::http::StatusCode;
use helpers::{PDF_BYTES, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_upload_requires_token() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/documents", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/documents", None, Some("not-a-token"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_pdf_and_list() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();

    let response = app.upload(&token, "Pitch Deck.pdf", PDF_BYTES).await;
    assert_eq!(response.status, StatusCode::CREATED);
    let data = response.data();
    assert_eq!(data["title"], "Pitch Deck");
    assert_eq!(data["file_type"], "pdf");
    assert_eq!(data["original_filename"], "Pitch Deck.pdf");
    assert_eq!(data["converted"], false);
    assert_eq!(data["file_size"], PDF_BYTES.len());

    let response = app.request("GET", "/api/documents", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data().as_array().unwrap().len(), 1);

    let (_, other) = app.new_owner();
    let response = app.request("GET", "/api/documents", None, Some(&other)).await;
    assert!(response.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_rejects_unsupported_type() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();

    let response = app.upload(&token, "notes.txt", b"hello").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_office_upload_rejected_without_converter() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();

    let response = app.upload(&token, "deck.pptx", b"PK\x03\x04").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_other_owner_cannot_read_or_delete() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let (_, intruder) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let path = format!("/api/documents/{document_id}");

    let response = app.request("GET", &path, None, Some(&intruder)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.request("DELETE", &path, None, Some(&intruder)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.request("GET", &path, None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_removes_links() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();
    let document_id = app.upload_pdf(&token).await;
    let link = app.create_link(&token, &document_id, json!({})).await;
    let code = link["link_code"].as_str().unwrap();

    let response = app
        .request("DELETE", &format!("/api/documents/{document_id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .request("GET", &format!("/api/documents/{document_id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("GET", &format!("/v/{code}"), None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_document_id() {
    let app = TestApp::new().await;
    let (_, token) = app.new_owner();

    let response = app
        .request("GET", "/api/documents/not-a-uuid", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
