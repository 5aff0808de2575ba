//! Integration tests for coursesync-drive
//!
//! Uses wiremock to simulate the Google Drive v3 API and verifies folder
//! resolution and resumable uploads end to end.

mod common;

mod test_folders;
mod test_upload;
