//! Resumable uploads for Google Drive
//!
//! Every file goes through a resumable session: one `POST` carrying the
//! metadata returns a session URI in the `Location` header, then a single
//! `PUT` sends the whole body. Course material is small enough that the
//! body is never split into chunks.
//!
//! ## Google Drive API References
//!
//! - [Resumable upload](https://developers.google.com/drive/api/guides/manage-uploads#resumable)

use anyhow::{Context, Result};
use coursesync_core::domain::{FolderRef, RemoteId};
use reqwest::header::LOCATION;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::client::DriveClient;

/// Content type sent for every upload; Drive sniffs the real type
const UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
}

/// Starts a resumable upload session and returns the session URI
///
/// # Arguments
/// * `client` - Authenticated Drive client
/// * `folder` - Parent folder of the new file
/// * `name` - File name as it should appear in Drive
/// * `size` - Total body size in bytes
pub async fn create_upload_session(
    client: &DriveClient,
    folder: &FolderRef,
    name: &str,
    size: u64,
) -> Result<String> {
    let metadata = serde_json::json!({
        "name": name,
        "parents": [folder.as_str()],
    });

    debug!(name, size, folder = %folder, "Creating upload session");

    let response = client
        .upload_request(Method::POST, "/files")
        .query(&[("uploadType", "resumable"), ("fields", "id")])
        .header("X-Upload-Content-Type", UPLOAD_CONTENT_TYPE)
        .header("X-Upload-Content-Length", size.to_string())
        .json(&metadata)
        .send()
        .await
        .context("Failed to create upload session")?;

    let response = DriveClient::check_status(response)
        .await
        .context("Create upload session returned error status")?;

    let session_url = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .context("Upload session response has no Location header")?;

    debug!(session_url = %session_url, "Upload session created");
    Ok(session_url)
}

/// Sends the whole file body to an upload session
///
/// # Returns
/// The Drive file ID of the created file
pub async fn upload_content(
    client: &DriveClient,
    session_url: &str,
    data: &[u8],
) -> Result<RemoteId> {
    let response = client
        .absolute_request(Method::PUT, session_url)
        .header("Content-Type", UPLOAD_CONTENT_TYPE)
        .header("Content-Length", data.len().to_string())
        .body(data.to_vec())
        .send()
        .await
        .context("Failed to send upload body")?;

    let uploaded: UploadedFile = DriveClient::check_status(response)
        .await
        .context("Upload returned error status")?
        .json()
        .await
        .context("Failed to parse upload response")?;

    RemoteId::new(uploaded.id).context("Drive returned an invalid file ID")
}

/// Uploads `data` as a new file named `name` in `folder`
pub async fn upload_file(
    client: &DriveClient,
    folder: &FolderRef,
    name: &str,
    data: &[u8],
) -> Result<RemoteId> {
    let session_url = create_upload_session(client, folder, name, data.len() as u64).await?;
    let remote_id = upload_content(client, &session_url, data).await?;
    debug!(name, bytes = data.len(), remote_id = %remote_id, "Upload completed");
    Ok(remote_id)
}
