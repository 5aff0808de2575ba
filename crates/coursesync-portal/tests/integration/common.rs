//! Shared helpers for Moodle integration tests
//!
//! Pages are served by wiremock. Every page after login requires the
//! `MoodleSession` cookie set by the credential post.

use std::time::Duration;

use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use coursesync_portal::{MoodleClient, MoodlePortalLister};

pub const SESSION_COOKIE: &str = "MoodleSession=s3ss10n";

pub const LOGIN_PAGE: &str = r#"<html><body>
<form class="login-form" action="/login/index.php" method="post" id="login">
  <input type="hidden" name="logintoken" value="tok3n">
  <input type="text" name="username" id="username">
  <input type="password" name="password" id="password">
  <button type="submit" id="loginbtn">Log in</button>
</form></body></html>"#;

pub const DASHBOARD: &str = r#"<html><body>
<div class="course-list">
  <a class="course-link" href="/course/view.php?id=2">Algebra</a>
  <a class="course-link" href="/course/view.php?id=3">Physics</a>
  <a class="course-link" href="/course/view.php?id=2">Algebra (again)</a>
</div></body></html>"#;

pub const ALGEBRA_PAGE: &str = r#"<html><body>
<h1>Linear Algebra</h1>
<a class="resource" href="/mod/resource/view.php?id=11">Lecture 1.pdf</a>
<a class="resource" href="/mod/resource/view.php?id=12">Exercises &amp; solutions.pdf</a>
<a class="forum" href="/mod/forum/view.php?id=13">Forum</a>
</body></html>"#;

pub const PHYSICS_PAGE: &str = r#"<html><body>
<h1>Physics I</h1>
<a class="resource" href="/mod/resource/view.php?id=21"><span>Lab manual</span></a>
</body></html>"#;

/// Credentials the mocked login accepts
pub const USERNAME: &str = "student";
pub const PASSWORD: &str = "correct-horse";

pub fn lister_for(server: &MockServer, password: &str) -> MoodlePortalLister {
    let login_url = Url::parse(&format!("{}/login/index.php", server.uri())).unwrap();
    let dashboard_url = Url::parse(&format!("{}/my/", server.uri())).unwrap();
    let client = MoodleClient::new(
        login_url,
        dashboard_url,
        USERNAME,
        password,
        Duration::from_secs(5),
    )
    .expect("Failed to build MoodleClient");
    MoodlePortalLister::new(client)
}

/// Mounts the login page and a credential check that sets the session cookie
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/login/index.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login/index.php"))
        .and(body_string_contains("logintoken=tok3n"))
        .and(body_string_contains(format!("password={}", PASSWORD)))
        .respond_with(
            ResponseTemplate::new(303)
                .insert_header("Location", "/my/")
                .insert_header("Set-Cookie", format!("{}; path=/", SESSION_COOKIE)),
        )
        .with_priority(1)
        .mount(server)
        .await;

    // Anything else is a failed login
    Mock::given(method("POST"))
        .and(path("/login/index.php"))
        .respond_with(
            ResponseTemplate::new(303).insert_header("Location", "/login/index.php?errorcode=3"),
        )
        .with_priority(2)
        .mount(server)
        .await;
}

/// Mounts an HTML page that requires the session cookie
pub async fn mount_page(server: &MockServer, page_path: &str, id: Option<&str>, body: &str) {
    let mut mock = Mock::given(method("GET"))
        .and(path(page_path))
        .and(header("cookie", SESSION_COOKIE));
    if let Some(id) = id {
        mock = mock.and(query_param("id", id));
    }
    mock.respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts the whole happy-path site
pub async fn mount_site(server: &MockServer) {
    mount_login(server).await;
    mount_page(server, "/my/", None, DASHBOARD).await;
    mount_page(server, "/course/view.php", Some("2"), ALGEBRA_PAGE).await;
    mount_page(server, "/course/view.php", Some("3"), PHYSICS_PAGE).await;
}
