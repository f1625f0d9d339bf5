//! Tests for the Google Drive image source and Vision OCR.

mod common;

use autocards::google::{DriveClient, GoogleAuth, VisionClient};
use autocards::{Error, GoogleDriveSource, IdStore, ImageData, ImageSource, KvStore, TextExtractor};
use common::setup_mock_server;
use serde_json::json;
use wiremock::matchers::{
    body_partial_json, body_string_contains, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FOLDER_QUERY: &str =
    "name = 'Cards' and mimeType = 'application/vnd.google-apps.folder' and trashed = false";
const IMAGES_QUERY: &str =
    "'folder-1' in parents and mimeType contains 'image/' and trashed = false";

async fn mock_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn drive_for(server: &MockServer) -> DriveClient {
    let auth = GoogleAuth::new("client", "secret", "refresh")
        .token_url(format!("{}/token", server.uri()));
    DriveClient::new(auth).url(server.uri())
}

async fn mock_list(server: &MockServer, query: &str, files: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", query))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": files })))
        .mount(server)
        .await;
}

async fn mock_download(server: &MockServer, id: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/files/{}", id)))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

fn folder_entry() -> serde_json::Value {
    json!([{ "id": "folder-1", "name": "Cards", "mimeType": "application/vnd.google-apps.folder" }])
}

// ============================================================================
// Vision
// ============================================================================

#[tokio::test]
async fn test_vision_returns_full_text() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/images:annotate"))
        .and(query_param("key", "api-key"))
        .and(body_partial_json(json!({
            "requests": [{
                "image": { "content": "aGVsbG8=" },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responses": [{
                "textAnnotations": [{ "description": "ignored" }],
                "fullTextAnnotation": { "text": "Let's reconvene\nwhen you know more." }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vision = VisionClient::new("api-key").url(server.uri());
    let text = vision.img_to_str(b"hello").await.unwrap();
    assert_eq!(text, "Let's reconvene\nwhen you know more.");
}

#[tokio::test]
async fn test_vision_falls_back_to_first_annotation() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/images:annotate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responses": [{
                "textAnnotations": [
                    { "description": "The Russian research vessel." },
                    { "description": "The" }
                ]
            }]
        })))
        .mount(&server)
        .await;

    let vision = VisionClient::new("api-key").url(server.uri());
    let text = vision.img_to_str(b"img").await.unwrap();
    assert_eq!(text, "The Russian research vessel.");
}

#[tokio::test]
async fn test_vision_without_text_returns_empty() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/images:annotate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "responses": [{}] })))
        .mount(&server)
        .await;

    let vision = VisionClient::new("api-key").url(server.uri());
    assert_eq!(vision.img_to_str(b"img").await.unwrap(), "");
}

#[tokio::test]
async fn test_vision_image_error() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/images:annotate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responses": [{ "error": { "code": 3, "message": "Bad image data." } }]
        })))
        .mount(&server)
        .await;

    let vision = VisionClient::new("api-key").url(server.uri());
    let err = vision.img_to_str(b"img").await.unwrap_err();
    assert!(matches!(err, Error::Vision(msg) if msg == "Bad image data."));
}

#[tokio::test]
async fn test_vision_http_error() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/images:annotate"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let vision = VisionClient::new("bad-key").url(server.uri());
    let err = vision.img_to_str(b"img").await.unwrap_err();
    assert!(matches!(err, Error::Vision(msg) if msg.contains("API key not valid")));
}

// ============================================================================
// Drive
// ============================================================================

#[tokio::test]
async fn test_token_is_cached_across_calls() {
    let server = setup_mock_server().await;
    mock_token(&server, 1).await;
    mock_list(&server, FOLDER_QUERY, folder_entry()).await;

    let mut drive = drive_for(&server);
    assert_eq!(drive.folder_id("Cards").await.unwrap().as_deref(), Some("folder-1"));
    assert_eq!(drive.folder_id("Cards").await.unwrap().as_deref(), Some("folder-1"));
}

#[tokio::test]
async fn test_token_failure() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .mount(&server)
        .await;

    let mut drive = drive_for(&server);
    let err = drive.folder_id("Cards").await.unwrap_err();
    assert!(matches!(err, Error::GoogleAuth(msg) if msg.contains("invalid_grant")));
}

#[tokio::test]
async fn test_drive_error_message() {
    let server = setup_mock_server().await;
    mock_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": 401, "message": "Invalid Credentials" }
        })))
        .mount(&server)
        .await;

    let mut drive = drive_for(&server);
    let err = drive.folder_id("Cards").await.unwrap_err();
    assert!(matches!(err, Error::Drive(msg) if msg.contains("Invalid Credentials")));
}

#[tokio::test]
async fn test_drive_source_skips_consumed_and_empty_files() {
    let server = setup_mock_server().await;
    mock_token(&server, 1).await;
    mock_list(&server, FOLDER_QUERY, folder_entry()).await;
    mock_list(
        &server,
        IMAGES_QUERY,
        json!([
            { "id": "img-a", "name": "a.png", "mimeType": "image/png" },
            { "id": "img-b", "name": "b.png", "mimeType": "image/png" },
            { "id": "img-c", "name": "c.jpg", "mimeType": "image/jpeg" }
        ]),
    )
    .await;
    mock_download(&server, "img-a", b"first image").await;
    mock_download(&server, "img-c", b"").await;
    Mock::given(method("GET"))
        .and(path("/files/img-b"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let consumed = IdStore::new(KvStore::new(dir.path().join("db.json")));
    consumed.insert_many(["img-b"]).unwrap();

    let mut source = GoogleDriveSource::new("Cards", drive_for(&server), consumed);
    let images = source.get_images().await.unwrap();

    assert_eq!(
        images,
        vec![ImageData {
            bytes: b"first image".to_vec(),
            source: "img-a".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_drive_source_skips_file_that_fails_to_download() {
    let server = setup_mock_server().await;
    mock_token(&server, 1).await;
    mock_list(&server, FOLDER_QUERY, folder_entry()).await;
    mock_list(
        &server,
        IMAGES_QUERY,
        json!([
            { "id": "img-a", "name": "a.png", "mimeType": "image/png" },
            { "id": "img-b", "name": "b.png", "mimeType": "image/png" },
            { "id": "img-c", "name": "c.png", "mimeType": "image/png" }
        ]),
    )
    .await;
    mock_download(&server, "img-a", b"first").await;
    Mock::given(method("GET"))
        .and(path("/files/img-b"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": 500, "message": "Internal Error" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    mock_download(&server, "img-c", b"third").await;

    let dir = tempfile::tempdir().unwrap();
    let consumed = IdStore::new(KvStore::new(dir.path().join("db.json")));
    let mut source = GoogleDriveSource::new("Cards", drive_for(&server), consumed.clone());
    let images = source.get_images().await.unwrap();

    let ids: Vec<_> = images.iter().map(|i| i.source.as_str()).collect();
    assert_eq!(ids, vec!["img-a", "img-c"]);
    assert!(!consumed.contains("img-b").unwrap());
}

#[tokio::test]
async fn test_drive_source_missing_folder() {
    let server = setup_mock_server().await;
    mock_token(&server, 1).await;
    mock_list(&server, FOLDER_QUERY, json!([])).await;

    let dir = tempfile::tempdir().unwrap();
    let consumed = IdStore::new(KvStore::new(dir.path().join("db.json")));
    let mut source = GoogleDriveSource::new("Cards", drive_for(&server), consumed);

    let err = source.get_images().await.unwrap_err();
    assert!(matches!(err, Error::FolderNotFound(name) if name == "Cards"));
}

#[tokio::test]
async fn test_drive_source_records_ids_even_when_delete_fails() {
    let server = setup_mock_server().await;
    mock_token(&server, 1).await;
    Mock::given(method("DELETE"))
        .and(path("/files/img-a"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/files/img-b"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "The user does not have sufficient permissions" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let consumed = IdStore::new(KvStore::new(dir.path().join("db.json")));
    let mut source = GoogleDriveSource::new("Cards", drive_for(&server), consumed.clone());

    let images = vec![
        ImageData {
            bytes: vec![1],
            source: "img-a".to_string(),
        },
        ImageData {
            bytes: vec![2],
            source: "img-b".to_string(),
        },
    ];
    source.remove_images(&images).await.unwrap();

    assert!(consumed.contains("img-a").unwrap());
    assert!(consumed.contains("img-b").unwrap());
}
