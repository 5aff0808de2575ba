//! Integration tests for resumable uploads

use std::time::Duration;

use coursesync_core::domain::FolderRef;
use coursesync_core::ports::IRemoteStore;
use coursesync_drive::{upload, DriveRemoteStore};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, UPLOAD_PATH};

fn folder() -> FolderRef {
    FolderRef::new("course-folder-1".into()).unwrap()
}

#[tokio::test]
async fn test_upload_returns_remote_id() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_resumable_upload(&server, "1FiLe_id-42").await;

    let store = DriveRemoteStore::new(client);
    let remote_id = store
        .upload(&folder(), "Lecture 1.pdf", b"%PDF-1.7 test content")
        .await
        .expect("Upload failed");

    assert_eq!(remote_id.as_str(), "1FiLe_id-42");
}

#[tokio::test]
async fn test_upload_sends_metadata_then_body() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_resumable_upload(&server, "file1").await;

    let content = b"slide deck bytes";
    upload::upload_file(&client, &folder(), "slides.pptx", content)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let session = &requests[0];
    assert_eq!(session.method.as_str(), "POST");
    assert_eq!(
        session.headers.get("x-upload-content-length").unwrap(),
        &content.len().to_string()
    );
    let metadata: serde_json::Value = serde_json::from_slice(&session.body).unwrap();
    assert_eq!(metadata["name"], "slides.pptx");
    assert_eq!(metadata["parents"], serde_json::json!(["course-folder-1"]));

    let body = &requests[1];
    assert_eq!(body.method.as_str(), "PUT");
    assert_eq!(body.body, content.to_vec());
}

#[tokio::test]
async fn test_upload_zero_byte_file() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_resumable_upload(&server, "empty1").await;

    let remote_id = upload::upload_file(&client, &folder(), "empty.txt", &[])
        .await
        .unwrap();

    assert_eq!(remote_id.as_str(), "empty1");
    let requests = server.received_requests().await.unwrap();
    assert!(requests[1].body.is_empty());
}

#[tokio::test]
async fn test_session_without_location_fails() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path(format!("{}/files", UPLOAD_PATH)))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = upload::upload_file(&client, &folder(), "a.pdf", b"x")
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("Location"));
}

#[tokio::test]
async fn test_server_error_on_body_upload() {
    let (server, client) = common::setup_drive_mock().await;
    let session_url = format!(
        "{}{}/files?uploadType=resumable&upload_id=s2",
        server.uri(),
        UPLOAD_PATH
    );

    Mock::given(method("POST"))
        .and(path(format!("{}/files", UPLOAD_PATH)))
        .and(query_param("uploadType", "resumable"))
        .respond_with(ResponseTemplate::new(200).append_header("Location", session_url.as_str()))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(format!("{}/files", UPLOAD_PATH)))
        .respond_with(ResponseTemplate::new(503).set_body_string("backendError"))
        .mount(&server)
        .await;

    let err = upload::upload_file(&client, &folder(), "a.pdf", b"x")
        .await
        .unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Server error"), "got: {message}");
}

#[tokio::test]
async fn test_request_timeout_surfaces_as_error() {
    let server = wiremock::MockServer::start().await;
    let client = common::client_for(&server, Duration::from_millis(200));

    Mock::given(method("POST"))
        .and(path(format!("{}/files", UPLOAD_PATH)))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let result = upload::upload_file(&client, &folder(), "slow.pdf", b"x").await;
    assert!(result.is_err());
}
