//! Folder lookup and creation
//!
//! Drive folders are files with the `application/vnd.google-apps.folder`
//! MIME type. Names are not unique in Drive, so lookup returns the first
//! non-trashed match under the parent and creation only happens when none
//! exists.
//!
//! ## Google Drive API References
//!
//! - [files.list](https://developers.google.com/drive/api/reference/rest/v3/files/list)
//! - [Search query terms](https://developers.google.com/drive/api/guides/ref-search-terms)

use anyhow::{Context, Result};
use coursesync_core::domain::FolderRef;
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info};

use crate::client::DriveClient;

/// MIME type Drive uses for folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Alias Drive accepts for the user's My Drive root
const ROOT_ALIAS: &str = "root";

#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<FileIdOnly>,
}

#[derive(Debug, Deserialize)]
struct FileIdOnly {
    id: String,
}

/// Escapes a value for use inside a single-quoted `q` string literal
pub fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Builds the `files.list` query matching a folder by name under `parent`
pub fn folder_query(parent: Option<&FolderRef>, name: &str) -> String {
    let parent_id = parent.map(FolderRef::as_str).unwrap_or(ROOT_ALIAS);
    format!(
        "mimeType = '{}' and name = '{}' and '{}' in parents and trashed = false",
        FOLDER_MIME_TYPE,
        escape_query_value(name),
        escape_query_value(parent_id)
    )
}

/// Looks up a folder by exact name under `parent` (My Drive root when `None`)
pub async fn find_folder(
    client: &DriveClient,
    parent: Option<&FolderRef>,
    name: &str,
) -> Result<Option<FolderRef>> {
    let query = folder_query(parent, name);
    debug!(query = %query, "Searching for folder");

    let response = client
        .request(Method::GET, "/files")
        .query(&[
            ("q", query.as_str()),
            ("spaces", "drive"),
            ("fields", "files(id)"),
            ("pageSize", "1"),
        ])
        .send()
        .await
        .context("Failed to send folder search request")?;

    let list: FileListResponse = DriveClient::check_status(response)
        .await
        .with_context(|| format!("Folder search for '{}' failed", name))?
        .json()
        .await
        .context("Failed to parse folder search response")?;

    match list.files.into_iter().next() {
        Some(file) => Ok(Some(
            FolderRef::new(file.id).context("Drive returned an invalid folder ID")?,
        )),
        None => Ok(None),
    }
}

/// Creates a folder named `name` under `parent`
pub async fn create_folder(
    client: &DriveClient,
    parent: Option<&FolderRef>,
    name: &str,
) -> Result<FolderRef> {
    let parent_id = parent.map(FolderRef::as_str).unwrap_or(ROOT_ALIAS);
    let metadata = serde_json::json!({
        "name": name,
        "mimeType": FOLDER_MIME_TYPE,
        "parents": [parent_id],
    });

    let response = client
        .request(Method::POST, "/files")
        .query(&[("fields", "id")])
        .json(&metadata)
        .send()
        .await
        .context("Failed to send folder creation request")?;

    let created: FileIdOnly = DriveClient::check_status(response)
        .await
        .with_context(|| format!("Creating folder '{}' failed", name))?
        .json()
        .await
        .context("Failed to parse folder creation response")?;

    info!(name, folder_id = %created.id, "Created Drive folder");
    FolderRef::new(created.id).context("Drive returned an invalid folder ID")
}

/// Returns the folder named `name` under `parent`, creating it if needed
pub async fn ensure_folder(
    client: &DriveClient,
    parent: Option<&FolderRef>,
    name: &str,
) -> Result<FolderRef> {
    if let Some(existing) = find_folder(client, parent, name).await? {
        debug!(name, folder_id = %existing, "Found existing folder");
        return Ok(existing);
    }
    create_folder(client, parent, name).await
}
