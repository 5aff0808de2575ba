//! Integration tests for course listing and resource download

use coursesync_core::ports::{FetchHandle, IPortalLister};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_lists_resources_of_every_course_once() {
    let server = MockServer::start().await;
    common::mount_site(&server).await;

    let lister = common::lister_for(&server, common::PASSWORD);
    let entries = lister.list_course_files().await.unwrap();

    let summary: Vec<(String, &str, Option<&str>)> = entries
        .iter()
        .map(|e| {
            (
                e.file_id.as_str().replace(&server.uri(), ""),
                e.file_name.as_str(),
                e.course.as_deref(),
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            (
                "/mod/resource/view.php?id=11".to_string(),
                "Lecture 1.pdf",
                Some("Linear Algebra")
            ),
            (
                "/mod/resource/view.php?id=12".to_string(),
                "Exercises & solutions.pdf",
                Some("Linear Algebra")
            ),
            (
                "/mod/resource/view.php?id=21".to_string(),
                "Lab manual",
                Some("Physics I")
            ),
        ]
    );
    assert_eq!(entries[0].handle.as_str(), entries[0].file_id.as_str());
}

#[tokio::test]
async fn test_course_page_error_fails_listing() {
    let server = MockServer::start().await;
    common::mount_login(&server).await;
    common::mount_page(&server, "/my/", None, common::DASHBOARD).await;
    common::mount_page(&server, "/course/view.php", Some("2"), common::ALGEBRA_PAGE).await;

    Mock::given(method("GET"))
        .and(path("/course/view.php"))
        .and(query_param("id", "3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let lister = common::lister_for(&server, common::PASSWORD);
    let err = lister.list_course_files().await.unwrap_err();
    assert!(format!("{:#}", err).contains("HTTP 500"));
}

#[tokio::test]
async fn test_fetch_follows_redirect_to_file() {
    let server = MockServer::start().await;
    common::mount_site(&server).await;

    Mock::given(method("GET"))
        .and(path("/mod/resource/view.php"))
        .and(query_param("id", "11"))
        .and(header("cookie", common::SESSION_COOKIE))
        .respond_with(
            ResponseTemplate::new(303)
                .insert_header("Location", "/pluginfile.php/40/mod_resource/content/1/lecture1.pdf"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pluginfile.php/40/mod_resource/content/1/lecture1.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.5 lecture".to_vec()))
        .mount(&server)
        .await;

    let lister = common::lister_for(&server, common::PASSWORD);
    let entries = lister.list_course_files().await.unwrap();
    let data = lister.fetch(&entries[0].handle).await.unwrap();

    assert_eq!(data, b"%PDF-1.5 lecture");
}

#[tokio::test]
async fn test_fetch_redirected_to_login_is_session_expiry() {
    let server = MockServer::start().await;
    common::mount_site(&server).await;

    Mock::given(method("GET"))
        .and(path("/mod/resource/view.php"))
        .respond_with(ResponseTemplate::new(303).insert_header("Location", "/login/index.php"))
        .mount(&server)
        .await;

    let lister = common::lister_for(&server, common::PASSWORD);
    let handle = FetchHandle::new(format!("{}/mod/resource/view.php?id=99", server.uri()));
    let err = lister.fetch(&handle).await.unwrap_err();

    assert!(format!("{:#}", err).contains("Session expired"));
}

#[tokio::test]
async fn test_fetch_zero_byte_resource() {
    let server = MockServer::start().await;
    common::mount_site(&server).await;

    Mock::given(method("GET"))
        .and(path("/mod/resource/view.php"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(Vec::new()))
        .mount(&server)
        .await;

    let lister = common::lister_for(&server, common::PASSWORD);
    let handle = FetchHandle::new(format!("{}/mod/resource/view.php?id=5", server.uri()));
    let data = lister.fetch(&handle).await.unwrap();
    assert!(data.is_empty());
}
