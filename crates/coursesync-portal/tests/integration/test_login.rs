//! Integration tests for portal login

use coursesync_core::ports::IPortalLister;
use wiremock::MockServer;

use crate::common;

#[tokio::test]
async fn test_login_with_token_then_list() {
    let server = MockServer::start().await;
    common::mount_site(&server).await;

    let lister = common::lister_for(&server, common::PASSWORD);
    let entries = lister.list_course_files().await.expect("Listing failed");
    assert!(!entries.is_empty());

    let requests = server.received_requests().await.unwrap();
    let posts: Vec<_> = requests
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .collect();
    assert_eq!(posts.len(), 1);
    let body = String::from_utf8_lossy(&posts[0].body);
    assert!(body.contains("username=student"));
    assert!(body.contains("logintoken=tok3n"));
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let server = MockServer::start().await;
    common::mount_site(&server).await;

    let lister = common::lister_for(&server, "wrong");
    let err = lister.list_course_files().await.unwrap_err();

    let message = format!("{:#}", err);
    assert!(message.contains("Login rejected"), "got: {message}");
}

#[tokio::test]
async fn test_login_happens_once_per_lister() {
    let server = MockServer::start().await;
    common::mount_site(&server).await;

    let lister = common::lister_for(&server, common::PASSWORD);
    lister.list_course_files().await.unwrap();
    lister.list_course_files().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let posts = requests
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .count();
    assert_eq!(posts, 1);
}
