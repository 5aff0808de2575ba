//! Ledger port (driven/secondary port)
//!
//! This module defines the interface for the local persisted record of which
//! portal files have been seen and uploaded.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific
//!   and don't need domain-level classification.
//! - The ledger is append/update-only: there is deliberately no delete.
//! - `upsert` must write status, remote ID and timestamps atomically.

use std::collections::{HashMap, HashSet};

use crate::domain::{FileId, SyncRecord, SyncRun, SyncStatus};

/// Filter criteria for listing ledger records
///
/// All fields are optional; when `None`, no filtering is applied for that field.
/// Multiple filters are combined with AND logic.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Filter by upload status
    pub status: Option<SyncStatus>,
    /// Filter by course name (exact match)
    pub course: Option<String>,
}

impl RecordFilter {
    /// Creates a new empty filter (matches all records)
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status filter
    pub fn with_status(mut self, status: SyncStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the course filter
    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }

    /// Returns true if no filters are set
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.course.is_none()
    }
}

/// Port trait for the sync ledger
#[async_trait::async_trait]
pub trait ILedger: Send + Sync {
    /// Returns the record for `file_id`, if the file was ever processed
    async fn lookup(&self, file_id: &FileId) -> anyhow::Result<Option<SyncRecord>>;

    /// Creates or replaces the record keyed by its `file_id`
    async fn upsert(&self, record: &SyncRecord) -> anyhow::Result<()>;

    /// Returns every file ID in the ledger
    async fn all_ids(&self) -> anyhow::Result<HashSet<FileId>>;

    /// Lists records matching `filter`, ordered by file ID
    async fn list(&self, filter: &RecordFilter) -> anyhow::Result<Vec<SyncRecord>>;

    /// Counts records per status; statuses with no records are absent
    async fn count_by_status(&self) -> anyhow::Result<HashMap<SyncStatus, u64>>;

    /// Saves a run history entry (insert or update)
    async fn save_run(&self, run: &SyncRun) -> anyhow::Result<()>;

    /// Returns the most recently started run
    async fn last_run(&self) -> anyhow::Result<Option<SyncRun>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_builder() {
        let filter = RecordFilter::new();
        assert!(filter.is_empty());

        let filter = filter.with_status(SyncStatus::Failed).with_course("Physics");
        assert!(!filter.is_empty());
        assert_eq!(filter.status, Some(SyncStatus::Failed));
        assert_eq!(filter.course.as_deref(), Some("Physics"));
    }
}
