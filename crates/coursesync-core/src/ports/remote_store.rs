//! Remote store port (driven/secondary port)
//!
//! This module defines the interface for the cloud storage destination that
//! portal files are mirrored into.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result`; the orchestrator maps every failure to a
//!   transient per-file error and records the file as failed.
//! - Uploads are whole-file, single call. No resumption across runs.

use crate::domain::newtypes::{FolderRef, RemoteId};

/// Port trait for the storage destination
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Finds a folder by name under `parent` (the store's root when `None`),
    /// creating it if it does not exist
    async fn ensure_folder(&self, parent: Option<&FolderRef>, name: &str)
        -> anyhow::Result<FolderRef>;

    /// Uploads `data` as a new file named `file_name` inside `folder`
    ///
    /// # Returns
    /// The identifier the store assigned to the uploaded file
    async fn upload(
        &self,
        folder: &FolderRef,
        file_name: &str,
        data: &[u8],
    ) -> anyhow::Result<RemoteId>;
}
