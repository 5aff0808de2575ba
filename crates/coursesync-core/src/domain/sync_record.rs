//! SyncRecord domain entity
//!
//! A `SyncRecord` is the ledger's durable witness that a portal file has been
//! seen, and whether its upload to the remote store succeeded.
//!
//! ## State Machine
//!
//! ```text
//!                 upload ok
//!   ┌─────────┐ ───────────► ┌──────────┐
//!   │ Pending │              │ Uploaded │  (terminal)
//!   └─────────┘ ──┐          └──────────┘
//!                 │ upload          ▲
//!                 │ failed          │ retry ok (later run)
//!                 ▼                 │
//!            ┌────────┐ ────────────┘
//!            │ Failed │ ◄──┐
//!            └────────┘ ───┘ retry failed
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{FileId, RemoteId};

// ============================================================================
// SyncStatus
// ============================================================================

/// Upload state of a ledger record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Observed on the portal, upload not yet completed
    #[default]
    Pending,
    /// Uploaded to the remote store
    Uploaded,
    /// Last upload attempt failed; eligible for retry on the next run
    Failed,
}

impl SyncStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [SyncStatus; 3] = [SyncStatus::Pending, SyncStatus::Uploaded, SyncStatus::Failed];

    /// Returns the storage representation (`pending`, `uploaded`, `failed`)
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Uploaded => "uploaded",
            SyncStatus::Failed => "failed",
        }
    }

    /// Returns the status name for display
    pub fn name(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "Pending",
            SyncStatus::Uploaded => "Uploaded",
            SyncStatus::Failed => "Failed",
        }
    }

    /// Returns true if a file in this state must be (re)attempted
    pub fn needs_upload(&self) -> bool {
        !matches!(self, SyncStatus::Uploaded)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(SyncStatus::Pending),
            "uploaded" => Ok(SyncStatus::Uploaded),
            "failed" => Ok(SyncStatus::Failed),
            other => Err(DomainError::ValidationFailed(format!(
                "Unknown sync status: {other}"
            ))),
        }
    }
}

// ============================================================================
// SyncRecord
// ============================================================================

/// Raw field values of a [`SyncRecord`], as stored by a ledger adapter
///
/// Use [`SyncRecord::restore`] to turn this into a validated record.
#[derive(Debug, Clone)]
pub struct SyncRecordParts {
    pub file_id: FileId,
    pub file_name: String,
    pub course: Option<String>,
    pub status: SyncStatus,
    pub remote_id: Option<RemoteId>,
    pub synced_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub attempts: u32,
    pub first_seen_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One ledger row per portal file ever processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    file_id: FileId,
    file_name: String,
    course: Option<String>,
    status: SyncStatus,
    remote_id: Option<RemoteId>,
    synced_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
    attempts: u32,
    first_seen_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SyncRecord {
    /// Creates the record for a file observed for the first time
    pub fn new_pending(file_id: FileId, file_name: impl Into<String>, course: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            file_id,
            file_name: file_name.into(),
            course,
            status: SyncStatus::Pending,
            remote_id: None,
            synced_at: None,
            last_error: None,
            attempts: 0,
            first_seen_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a record from stored values, checking its invariants
    ///
    /// # Errors
    /// Returns `DomainError::ValidationFailed` if an `Uploaded` record lacks
    /// a remote ID or sync time, or a non-uploaded record carries a remote ID.
    pub fn restore(parts: SyncRecordParts) -> Result<Self, DomainError> {
        match parts.status {
            SyncStatus::Uploaded => {
                if parts.remote_id.is_none() || parts.synced_at.is_none() {
                    return Err(DomainError::ValidationFailed(format!(
                        "Uploaded record {} is missing remote_id or synced_at",
                        parts.file_id
                    )));
                }
            }
            SyncStatus::Pending | SyncStatus::Failed => {
                if parts.remote_id.is_some() {
                    return Err(DomainError::ValidationFailed(format!(
                        "{} record {} must not carry a remote_id",
                        parts.status.name(),
                        parts.file_id
                    )));
                }
            }
        }

        Ok(Self {
            file_id: parts.file_id,
            file_name: parts.file_name,
            course: parts.course,
            status: parts.status,
            remote_id: parts.remote_id,
            synced_at: parts.synced_at,
            last_error: parts.last_error,
            attempts: parts.attempts,
            first_seen_at: parts.first_seen_at,
            updated_at: parts.updated_at,
        })
    }

    pub fn file_id(&self) -> &FileId {
        &self.file_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn course(&self) -> Option<&str> {
        self.course.as_deref()
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn remote_id(&self) -> Option<&RemoteId> {
        self.remote_id.as_ref()
    }

    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.synced_at
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn first_seen_at(&self) -> DateTime<Utc> {
        self.first_seen_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true unless the file has already been uploaded
    pub fn needs_upload(&self) -> bool {
        self.status.needs_upload()
    }

    /// Records a successful upload
    ///
    /// # Errors
    /// Returns `DomainError::InvalidState` if the record is already uploaded.
    pub fn mark_uploaded(&mut self, remote_id: RemoteId, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_attemptable(SyncStatus::Uploaded)?;
        self.status = SyncStatus::Uploaded;
        self.remote_id = Some(remote_id);
        self.synced_at = Some(at);
        self.last_error = None;
        self.attempts += 1;
        self.updated_at = at;
        Ok(())
    }

    /// Records a failed upload attempt
    ///
    /// # Errors
    /// Returns `DomainError::InvalidState` if the record is already uploaded.
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_attemptable(SyncStatus::Failed)?;
        self.status = SyncStatus::Failed;
        self.last_error = Some(reason.into());
        self.attempts += 1;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Refreshes the cosmetic name and course
    ///
    /// Returns true if anything changed. Status, remote ID and sync time are
    /// never touched.
    pub fn refresh_display(&mut self, file_name: &str, course: Option<&str>) -> bool {
        let name_changed = self.file_name != file_name;
        let course_changed = course.is_some() && self.course.as_deref() != course;
        if !name_changed && !course_changed {
            return false;
        }
        if name_changed {
            self.file_name = file_name.to_string();
        }
        if course_changed {
            self.course = course.map(str::to_string);
        }
        self.updated_at = Utc::now();
        true
    }

    fn ensure_attemptable(&self, to: SyncStatus) -> Result<(), DomainError> {
        if self.status == SyncStatus::Uploaded {
            return Err(DomainError::InvalidState {
                from: self.status.name().to_string(),
                to: to.name().to_string(),
            });
        }
        Ok(())
    }
}
