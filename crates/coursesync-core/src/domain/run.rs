//! SyncRun domain entity
//!
//! One `SyncRun` is written per orchestrator invocation so that `status`
//! can report when the ledger was last reconciled and how that went.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::RunId;

/// Outcome of a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Run is in progress (or the process died before finishing)
    #[default]
    Running,
    /// Listing was exhausted; per-file failures may still have occurred
    Completed,
    /// Run stopped before file processing
    Aborted(String),
}

impl RunOutcome {
    /// Returns true if the run has finished
    pub fn is_finished(&self) -> bool {
        !matches!(self, RunOutcome::Running)
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Running => write!(f, "running"),
            RunOutcome::Completed => write!(f, "completed"),
            RunOutcome::Aborted(reason) => write!(f, "aborted: {}", reason),
        }
    }
}

/// History entry for one orchestrator invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRun {
    pub id: RunId,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub listed: u32,
    pub uploaded: u32,
    pub skipped: u32,
    pub failed: u32,
    pub outcome: RunOutcome,
}

impl SyncRun {
    /// Starts a new run record
    pub fn start() -> Self {
        Self {
            id: RunId::new(),
            started_at: Utc::now(),
            completed_at: None,
            listed: 0,
            uploaded: 0,
            skipped: 0,
            failed: 0,
            outcome: RunOutcome::Running,
        }
    }

    /// Marks the run as completed with its final counters
    pub fn complete(&mut self, listed: u32, uploaded: u32, skipped: u32, failed: u32) {
        self.listed = listed;
        self.uploaded = uploaded;
        self.skipped = skipped;
        self.failed = failed;
        self.outcome = RunOutcome::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Marks the run as aborted before file processing
    pub fn abort(&mut self, reason: impl Into<String>) {
        self.outcome = RunOutcome::Aborted(reason.into());
        self.completed_at = Some(Utc::now());
    }

    /// Wall-clock duration, if the run has finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|end| end - self.started_at)
    }
}
