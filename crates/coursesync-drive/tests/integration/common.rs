//! Shared test helpers for Drive API integration tests
//!
//! Each helper mounts the endpoints a scenario needs on a wiremock server.
//! Clients built here point both base URLs at the mock server.

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use coursesync_drive::client::DriveClient;

pub const API_PATH: &str = "/drive/v3";
pub const UPLOAD_PATH: &str = "/upload/drive/v3";

/// Starts a mock server and returns a (MockServer, DriveClient) tuple
pub async fn setup_drive_mock() -> (MockServer, DriveClient) {
    let server = MockServer::start().await;
    let client = client_for(&server, Duration::from_secs(5));
    (server, client)
}

pub fn client_for(server: &MockServer, timeout: Duration) -> DriveClient {
    DriveClient::with_base_urls(
        "test-access-token",
        format!("{}{}", server.uri(), API_PATH),
        format!("{}{}", server.uri(), UPLOAD_PATH),
        timeout,
    )
    .expect("Failed to build DriveClient")
}

/// Mounts `files.list` returning the given folder IDs
pub async fn mount_folder_search(server: &MockServer, ids: &[&str]) {
    let files: Vec<_> = ids.iter().map(|id| serde_json::json!({ "id": id })).collect();
    Mock::given(method("GET"))
        .and(path(format!("{}/files", API_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": files
        })))
        .mount(server)
        .await;
}

/// Mounts `files.create` for folders returning `id`
pub async fn mount_folder_create(server: &MockServer, id: &str) {
    Mock::given(method("POST"))
        .and(path(format!("{}/files", API_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": id })))
        .mount(server)
        .await;
}

/// Mounts a resumable session (`POST`) and its body upload (`PUT`)
///
/// The session URI handed out carries `upload_id=session-1`; the `PUT`
/// returns `file_id`.
pub async fn mount_resumable_upload(server: &MockServer, file_id: &str) {
    let session_url = format!(
        "{}{}/files?uploadType=resumable&upload_id=session-1",
        server.uri(),
        UPLOAD_PATH
    );

    Mock::given(method("POST"))
        .and(path(format!("{}/files", UPLOAD_PATH)))
        .and(query_param("uploadType", "resumable"))
        .respond_with(ResponseTemplate::new(200).append_header("Location", session_url.as_str()))
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path(format!("{}/files", UPLOAD_PATH)))
        .and(query_param("upload_id", "session-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "drive#file",
            "id": file_id,
            "name": "ignored.pdf",
            "mimeType": "application/pdf"
        })))
        .mount(server)
        .await;
}
