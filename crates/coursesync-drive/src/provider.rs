//! DriveRemoteStore - IRemoteStore implementation for Google Drive
//!
//! Delegates to the [`folders`] and [`upload`] modules.
//!
//! ## Design Notes
//!
//! - No token refresh: the access token is read once from configuration.
//!   An expired token surfaces as `DriveError::Unauthorized` on every
//!   upload, which the orchestrator records per file.
//! - Uploading the same name twice creates two Drive files. Deduplication
//!   is the ledger's job, not this adapter's.

use anyhow::Result;
use tracing::debug;

use coursesync_core::domain::{FolderRef, RemoteId};
use coursesync_core::ports::IRemoteStore;

use crate::client::DriveClient;
use crate::folders;
use crate::upload;

/// Google Drive adapter for the `IRemoteStore` port
pub struct DriveRemoteStore {
    client: DriveClient,
}

impl DriveRemoteStore {
    /// Creates a new store with the given client
    pub fn new(client: DriveClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl IRemoteStore for DriveRemoteStore {
    async fn ensure_folder(&self, parent: Option<&FolderRef>, name: &str) -> Result<FolderRef> {
        folders::ensure_folder(&self.client, parent, name).await
    }

    async fn upload(&self, folder: &FolderRef, file_name: &str, data: &[u8]) -> Result<RemoteId> {
        debug!(file_name, bytes = data.len(), "Uploading to Drive");
        upload::upload_file(&self.client, folder, file_name, data).await
    }
}
