//! Portal lister port (driven/secondary port)
//!
//! This module defines the interface for enumerating the files published on
//! the learning portal and downloading their content.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific
//!   (HTTP, HTML layout changes, expired sessions).
//! - The listing is a finite snapshot taken once per run. Session
//!   establishment (login) is the adapter's concern and happens before the
//!   listing is returned.
//! - [`FetchHandle`] is opaque to the core; only the adapter that produced it
//!   knows how to turn it into bytes.

use serde::{Deserialize, Serialize};

use crate::domain::newtypes::FileId;

/// Opaque locator the portal adapter uses to download an entry's content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FetchHandle(String);

impl FetchHandle {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single file observed on the portal
///
/// This is a port-level DTO. The orchestrator maps it onto a ledger
/// [`SyncRecord`](crate::domain::SyncRecord) by `file_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalEntry {
    /// Stable portal-assigned identifier (dedup key)
    pub file_id: FileId,
    /// Display name as currently shown on the portal
    pub file_name: String,
    /// Course the file is published under, when known
    pub course: Option<String>,
    /// How to download the file
    pub handle: FetchHandle,
}

/// Port trait for the learning portal
#[async_trait::async_trait]
pub trait IPortalLister: Send + Sync {
    /// Lists every file currently visible across the user's courses
    ///
    /// # Errors
    /// Any error here aborts the run before the ledger is touched.
    async fn list_course_files(&self) -> anyhow::Result<Vec<PortalEntry>>;

    /// Downloads the content behind a handle returned by
    /// [`list_course_files`](Self::list_course_files)
    async fn fetch(&self, handle: &FetchHandle) -> anyhow::Result<Vec<u8>>;
}
