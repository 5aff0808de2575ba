//! Integration tests for folder resolution

use coursesync_core::domain::FolderRef;
use coursesync_core::ports::IRemoteStore;
use coursesync_drive::{folders, DriveRemoteStore};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, API_PATH};

#[tokio::test]
async fn test_find_folder_returns_first_match() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_folder_search(&server, &["folderA", "folderB"]).await;

    let found = folders::find_folder(&client, None, "Moodle Sync")
        .await
        .expect("Search failed");

    assert_eq!(found.unwrap().as_str(), "folderA");
}

#[tokio::test]
async fn test_find_folder_sends_query_and_token() {
    let (server, client) = common::setup_drive_mock().await;
    let parent = FolderRef::new("root-1".into()).unwrap();

    Mock::given(method("GET"))
        .and(path(format!("{}/files", API_PATH)))
        .and(header("authorization", "Bearer test-access-token"))
        .and(query_param(
            "q",
            "mimeType = 'application/vnd.google-apps.folder' and name = 'Emma\\'s course' \
             and 'root-1' in parents and trashed = false",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "files": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let found = folders::find_folder(&client, Some(&parent), "Emma's course")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_ensure_folder_reuses_existing() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_folder_search(&server, &["existing1"]).await;

    let store = DriveRemoteStore::new(client);
    let folder = store.ensure_folder(None, "Moodle Sync").await.unwrap();

    assert_eq!(folder.as_str(), "existing1");
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.method.as_str() == "GET"));
}

#[tokio::test]
async fn test_ensure_folder_creates_when_missing() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_folder_search(&server, &[]).await;
    common::mount_folder_create(&server, "created1").await;

    let parent = FolderRef::new("root-1".into()).unwrap();
    let store = DriveRemoteStore::new(client);
    let folder = store
        .ensure_folder(Some(&parent), "Algebra")
        .await
        .unwrap();

    assert_eq!(folder.as_str(), "created1");

    let requests = server.received_requests().await.unwrap();
    let create = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .expect("No create request sent");
    let body: serde_json::Value = serde_json::from_slice(&create.body).unwrap();
    assert_eq!(body["name"], "Algebra");
    assert_eq!(body["mimeType"], "application/vnd.google-apps.folder");
    assert_eq!(body["parents"], serde_json::json!(["root-1"]));
}

#[tokio::test]
async fn test_folder_search_unauthorized() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/files", API_PATH)))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Credentials"))
        .mount(&server)
        .await;

    let err = folders::ensure_folder(&client, None, "Moodle Sync")
        .await
        .unwrap_err();

    let message = format!("{:#}", err);
    assert!(message.contains("Unauthorized"), "got: {message}");
    assert!(message.contains("Invalid Credentials"));
}
