//! Integration tests for coursesync-portal
//!
//! Uses wiremock to simulate a Moodle site: login form, dashboard, course
//! pages and resource downloads behind a session cookie.

mod common;

mod test_listing;
mod test_login;
