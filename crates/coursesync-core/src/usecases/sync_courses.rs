//! Course file synchronization use case
//!
//! Mirrors newly published portal files into the remote store exactly once
//! per `file_id`, using the ledger as the dedup witness.
//!
//! ## Run Flow
//!
//! 1. Take one listing snapshot from the portal (failure aborts the run)
//! 2. For each entry, look it up in the ledger; `Uploaded` entries are skipped
//! 3. Otherwise download, upload, and commit the new status to the ledger
//! 4. Per-file failures are recorded as `Failed` and the run moves on
//!
//! Files are processed one after another; there is no retry within a run.
//! A later invocation retries anything left `Failed` or `Pending`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::DriveConfig;
use crate::domain::{
    FileId, FolderRef, RemoteId, RunId, SyncError, SyncErrorKind, SyncRecord, SyncRun, SyncStatus,
};
use crate::ports::{ILedger, IPortalLister, IRemoteStore, PortalEntry};

// ============================================================================
// Options
// ============================================================================

/// Where uploads land in the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootFolder {
    /// A folder whose ID is known up front
    Id(FolderRef),
    /// A top-level folder found (or created) by name on first use
    Named(String),
}

/// Orchestrator settings derived from configuration
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub root_folder: RootFolder,
    /// Upload into one sub-folder per course instead of the root itself
    pub per_course_folders: bool,
}

impl SyncOptions {
    /// Builds options from the `drive` configuration section
    ///
    /// # Errors
    /// Returns `SyncError::Configuration` if the root folder ID is malformed.
    pub fn from_config(drive: &DriveConfig) -> Result<Self, SyncError> {
        let root_folder = match &drive.root_folder_id {
            Some(id) => RootFolder::Id(
                FolderRef::new(id.clone())
                    .map_err(|e| SyncError::Configuration(format!("drive.root_folder_id: {e}")))?,
            ),
            None => RootFolder::Named(drive.root_folder_name.clone()),
        };
        Ok(Self {
            root_folder,
            per_course_folders: drive.per_course_folders,
        })
    }
}

// ============================================================================
// Reports
// ============================================================================

/// A file that could not be synced in this run
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub file_id: FileId,
    pub file_name: String,
    pub kind: SyncErrorKind,
    pub message: String,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub run_id: RunId,
    /// Distinct files in the listing
    pub listed: u32,
    pub uploaded: u32,
    /// Files already uploaded by an earlier run
    pub skipped: u32,
    pub failed: u32,
    /// Already-uploaded files whose display name was refreshed
    pub renamed: u32,
    pub failures: Vec<FileFailure>,
    pub duration_ms: u64,
}

impl SyncReport {
    fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            listed: 0,
            uploaded: 0,
            skipped: 0,
            failed: 0,
            renamed: 0,
            failures: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Why a listing entry would be attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanReason {
    /// Never seen before
    New,
    /// A previous attempt failed
    RetryFailed,
    /// A previous run stopped before finishing this file
    RetryPending,
}

/// An entry a real run would download and upload
#[derive(Debug, Clone, Serialize)]
pub struct PlannedUpload {
    pub entry: PortalEntry,
    pub reason: PlanReason,
}

enum EntryOutcome {
    Uploaded,
    AlreadySynced { renamed: bool },
}

/// Resolved destination folders, valid for one run
type FolderCache = HashMap<Option<String>, FolderRef>;

// ============================================================================
// SyncCoursesUseCase
// ============================================================================

/// Use case that mirrors portal files into the remote store
pub struct SyncCoursesUseCase {
    portal: Arc<dyn IPortalLister>,
    remote_store: Arc<dyn IRemoteStore>,
    ledger: Arc<dyn ILedger>,
    options: SyncOptions,
}

impl SyncCoursesUseCase {
    /// Creates a new SyncCoursesUseCase with the required dependencies
    ///
    /// # Arguments
    ///
    /// * `portal` - Source of the file listing and file content
    /// * `remote_store` - Upload destination
    /// * `ledger` - Persistent dedup record and run history
    /// * `options` - Destination folder settings
    pub fn new(
        portal: Arc<dyn IPortalLister>,
        remote_store: Arc<dyn IRemoteStore>,
        ledger: Arc<dyn ILedger>,
        options: SyncOptions,
    ) -> Self {
        Self {
            portal,
            remote_store,
            ledger,
            options,
        }
    }

    /// Performs one sync pass over the current portal listing
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Listing` if the listing cannot be obtained; the
    /// ledger is left untouched in that case. Per-file failures never make
    /// this method fail; they are reported in [`SyncReport::failures`].
    #[tracing::instrument(skip(self))]
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let start = Instant::now();
        let mut run = SyncRun::start();
        let mut report = SyncReport::new(run.id);
        self.record_run(&run).await;

        let entries = match self.portal.list_course_files().await {
            Ok(entries) => entries,
            Err(err) => {
                let err = SyncError::Listing(err);
                error!(run_id = %run.id, error = %err, "Aborting run");
                run.abort(err.to_string());
                self.record_run(&run).await;
                return Err(err);
            }
        };

        info!(run_id = %run.id, entries = entries.len(), "Portal listing received");

        let mut seen: HashSet<FileId> = HashSet::new();
        let mut folders = FolderCache::new();

        for entry in &entries {
            if !seen.insert(entry.file_id.clone()) {
                debug!(file_id = %entry.file_id, "Duplicate listing entry, already handled");
                continue;
            }
            report.listed += 1;

            match self.sync_entry(entry, &mut folders).await {
                Ok(EntryOutcome::Uploaded) => report.uploaded += 1,
                Ok(EntryOutcome::AlreadySynced { renamed }) => {
                    report.skipped += 1;
                    if renamed {
                        report.renamed += 1;
                    }
                }
                Err(err) => {
                    warn!(
                        file_id = %entry.file_id,
                        file_name = %entry.file_name,
                        kind = err.kind().name(),
                        error = %err,
                        "File sync failed"
                    );
                    report.failed += 1;
                    report.failures.push(FileFailure {
                        file_id: entry.file_id.clone(),
                        file_name: entry.file_name.clone(),
                        kind: err.kind(),
                        message: err.to_string(),
                    });
                }
            }
        }

        run.complete(report.listed, report.uploaded, report.skipped, report.failed);
        self.record_run(&run).await;

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %run.id,
            listed = report.listed,
            uploaded = report.uploaded,
            skipped = report.skipped,
            failed = report.failed,
            duration_ms = report.duration_ms,
            "Sync run completed"
        );

        Ok(report)
    }

    /// Lists the entries a run would attempt, without side effects
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Listing` if the listing cannot be obtained, or
    /// `SyncError::Persistence` if the ledger cannot be read.
    pub async fn plan(&self) -> Result<Vec<PlannedUpload>, SyncError> {
        let entries = self
            .portal
            .list_course_files()
            .await
            .map_err(SyncError::Listing)?;

        let mut seen: HashSet<FileId> = HashSet::new();
        let mut planned = Vec::new();

        for entry in entries {
            if !seen.insert(entry.file_id.clone()) {
                continue;
            }
            let existing = self
                .ledger
                .lookup(&entry.file_id)
                .await
                .map_err(SyncError::Persistence)?;
            let reason = match existing.map(|r| r.status()) {
                None => PlanReason::New,
                Some(SyncStatus::Failed) => PlanReason::RetryFailed,
                Some(SyncStatus::Pending) => PlanReason::RetryPending,
                Some(SyncStatus::Uploaded) => continue,
            };
            planned.push(PlannedUpload { entry, reason });
        }

        Ok(planned)
    }

    /// Processes one listing entry as an isolated transaction
    async fn sync_entry(
        &self,
        entry: &PortalEntry,
        folders: &mut FolderCache,
    ) -> Result<EntryOutcome, SyncError> {
        let existing = self
            .ledger
            .lookup(&entry.file_id)
            .await
            .map_err(|e| SyncError::Persistence(e.context("Failed to read ledger record")))?;

        let mut record = match existing {
            Some(mut record) if !record.needs_upload() => {
                let renamed = record.refresh_display(&entry.file_name, entry.course.as_deref());
                if renamed {
                    debug!(file_id = %entry.file_id, file_name = %entry.file_name, "Refreshing display name");
                    self.ledger.upsert(&record).await.map_err(|e| {
                        SyncError::Persistence(e.context("Failed to refresh ledger record"))
                    })?;
                }
                return Ok(EntryOutcome::AlreadySynced { renamed });
            }
            Some(mut record) => {
                record.refresh_display(&entry.file_name, entry.course.as_deref());
                debug!(
                    file_id = %entry.file_id,
                    status = %record.status(),
                    attempts = record.attempts(),
                    "Retrying file"
                );
                record
            }
            None => {
                let record = SyncRecord::new_pending(
                    entry.file_id.clone(),
                    entry.file_name.clone(),
                    entry.course.clone(),
                );
                self.ledger.upsert(&record).await.map_err(|e| {
                    SyncError::Persistence(e.context("Failed to record pending file"))
                })?;
                record
            }
        };

        match self.transfer(entry, folders).await {
            Ok(remote_id) => {
                let mut uploaded = record.clone();
                uploaded
                    .mark_uploaded(remote_id, Utc::now())
                    .map_err(|e| SyncError::Persistence(e.into()))?;

                if let Err(err) = self.ledger.upsert(&uploaded).await {
                    let err = SyncError::Persistence(
                        err.context("Failed to commit uploaded status to ledger"),
                    );
                    self.mark_failed_best_effort(&mut record, &err).await;
                    return Err(err);
                }

                info!(
                    file_id = %entry.file_id,
                    file_name = %entry.file_name,
                    remote_id = %uploaded.remote_id().map(RemoteId::as_str).unwrap_or_default(),
                    "Uploaded file"
                );
                Ok(EntryOutcome::Uploaded)
            }
            Err(err) => {
                self.mark_failed_best_effort(&mut record, &err).await;
                Err(err)
            }
        }
    }

    /// Downloads the entry and uploads it to its destination folder
    async fn transfer(
        &self,
        entry: &PortalEntry,
        folders: &mut FolderCache,
    ) -> Result<RemoteId, SyncError> {
        let data = self.portal.fetch(&entry.handle).await.map_err(|e| {
            SyncError::TransientFetch(e.context(format!("Failed to download {}", entry.file_name)))
        })?;

        let folder = self
            .destination_folder(entry.course.as_deref(), folders)
            .await?;

        debug!(
            file_id = %entry.file_id,
            bytes = data.len(),
            folder = %folder,
            "Uploading file"
        );

        self.remote_store
            .upload(&folder, &entry.file_name, &data)
            .await
            .map_err(|e| {
                SyncError::TransientFetch(e.context(format!("Failed to upload {}", entry.file_name)))
            })
    }

    /// Resolves (and caches) the folder a file of `course` goes into
    async fn destination_folder(
        &self,
        course: Option<&str>,
        folders: &mut FolderCache,
    ) -> Result<FolderRef, SyncError> {
        let root = match folders.get(&None) {
            Some(root) => root.clone(),
            None => {
                let root = match &self.options.root_folder {
                    RootFolder::Id(id) => id.clone(),
                    RootFolder::Named(name) => self
                        .remote_store
                        .ensure_folder(None, name)
                        .await
                        .map_err(|e| {
                            SyncError::TransientFetch(
                                e.context(format!("Failed to resolve root folder '{name}'")),
                            )
                        })?,
                };
                folders.insert(None, root.clone());
                root
            }
        };

        let course = match course {
            Some(course) if self.options.per_course_folders => course,
            _ => return Ok(root),
        };

        let key = Some(course.to_string());
        if let Some(folder) = folders.get(&key) {
            return Ok(folder.clone());
        }

        let folder = self
            .remote_store
            .ensure_folder(Some(&root), course)
            .await
            .map_err(|e| {
                SyncError::TransientFetch(
                    e.context(format!("Failed to resolve course folder '{course}'")),
                )
            })?;
        folders.insert(key, folder.clone());
        Ok(folder)
    }

    /// Writes a `Failed` status; a ledger error here only gets logged since
    /// the caller is already reporting `cause`
    async fn mark_failed_best_effort(&self, record: &mut SyncRecord, cause: &SyncError) {
        if let Err(e) = record.mark_failed(cause.to_string()) {
            warn!(file_id = %record.file_id(), error = %e, "Cannot mark record as failed");
            return;
        }
        if let Err(e) = self.ledger.upsert(record).await {
            warn!(
                file_id = %record.file_id(),
                error = %format!("{e:#}"),
                "Failed to record failure in ledger"
            );
        }
    }

    async fn record_run(&self, run: &SyncRun) {
        if let Err(e) = self.ledger.save_run(run).await {
            warn!(run_id = %run.id, error = %format!("{e:#}"), "Failed to save run history");
        }
    }
}
