//! SQLite implementation of ILedger
//!
//! ## Type Mapping
//!
//! | Domain Type     | SQL Type | Strategy                                        |
//! |-----------------|----------|-------------------------------------------------|
//! | FileId          | TEXT     | `.as_str()` / `FileId::new()`                   |
//! | RemoteId        | TEXT     | `.as_str()` / `RemoteId::new()`                 |
//! | RunId           | TEXT     | UUID string via `.to_string()` / `FromStr`      |
//! | SyncStatus      | TEXT     | `as_str()` / `FromStr` (`pending`, `uploaded`, `failed`) |
//! | RunOutcome      | TEXT     | `running`, `completed`, `aborted:<reason>`      |
//! | DateTime<Utc>   | TEXT     | RFC 3339 via `to_rfc3339()`                     |
//! | u32 counters    | INTEGER  | widened to `i64`                                |

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use coursesync_core::domain::{
    FileId, RemoteId, RunId, RunOutcome, SyncRecord, SyncRecordParts, SyncRun, SyncStatus,
};
use coursesync_core::ports::{ILedger, RecordFilter};

use crate::CacheError;

/// SQLite-backed ledger of processed portal files
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Creates a new ledger over the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Helper functions for type conversion
// ============================================================================

fn run_outcome_to_string(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Running => "running".to_string(),
        RunOutcome::Completed => "completed".to_string(),
        RunOutcome::Aborted(reason) => format!("aborted:{}", reason),
    }
}

fn run_outcome_from_string(s: &str) -> Result<RunOutcome, CacheError> {
    match s {
        "running" => Ok(RunOutcome::Running),
        "completed" => Ok(RunOutcome::Completed),
        s if s.starts_with("aborted:") => Ok(RunOutcome::Aborted(s[8..].to_string())),
        other => Err(CacheError::SerializationError(format!(
            "Unknown run outcome: {}",
            other
        ))),
    }
}

/// Parse a DateTime<Utc> from an RFC 3339 string
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, CacheError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite's CURRENT_TIMESTAMP format
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| {
            CacheError::SerializationError(format!("Failed to parse datetime '{}': {}", s, e))
        })
}

fn parse_optional_datetime(s: Option<String>) -> Result<Option<DateTime<Utc>>, CacheError> {
    match s {
        Some(ref val) if !val.is_empty() => parse_datetime(val).map(Some),
        _ => Ok(None),
    }
}

fn to_u32(value: i64, column: &str) -> Result<u32, CacheError> {
    u32::try_from(value).map_err(|_| {
        CacheError::SerializationError(format!("Column {} out of range: {}", column, value))
    })
}

// ============================================================================
// Row mapping functions
// ============================================================================

fn record_from_row(row: &SqliteRow) -> Result<SyncRecord, CacheError> {
    let file_id_str: String = row.get("file_id");
    let status_str: String = row.get("status");
    let remote_id_str: Option<String> = row.get("remote_id");
    let synced_at_str: Option<String> = row.get("synced_at");
    let attempts: i64 = row.get("attempts");
    let first_seen_str: String = row.get("first_seen_at");
    let updated_str: String = row.get("updated_at");

    let file_id = FileId::new(file_id_str.clone()).map_err(|e| {
        CacheError::SerializationError(format!("Invalid file_id '{}': {}", file_id_str, e))
    })?;

    let status = SyncStatus::from_str(&status_str).map_err(|e| {
        CacheError::SerializationError(format!("Invalid status for '{}': {}", file_id_str, e))
    })?;

    let remote_id = remote_id_str
        .map(|id| {
            RemoteId::new(id.clone()).map_err(|e| {
                CacheError::SerializationError(format!("Invalid remote_id '{}': {}", id, e))
            })
        })
        .transpose()?;

    let parts = SyncRecordParts {
        file_id,
        file_name: row.get("file_name"),
        course: row.get("course"),
        status,
        remote_id,
        synced_at: parse_optional_datetime(synced_at_str)?,
        last_error: row.get("last_error"),
        attempts: to_u32(attempts, "attempts")?,
        first_seen_at: parse_datetime(&first_seen_str)?,
        updated_at: parse_datetime(&updated_str)?,
    };

    SyncRecord::restore(parts).map_err(|e| {
        CacheError::SerializationError(format!(
            "Inconsistent ledger row '{}': {}",
            file_id_str, e
        ))
    })
}

fn run_from_row(row: &SqliteRow) -> Result<SyncRun, CacheError> {
    let id_str: String = row.get("id");
    let started_str: String = row.get("started_at");
    let completed_str: Option<String> = row.get("completed_at");
    let outcome_str: String = row.get("outcome");

    let id = RunId::from_str(&id_str).map_err(|e| {
        CacheError::SerializationError(format!("Invalid run id '{}': {}", id_str, e))
    })?;

    Ok(SyncRun {
        id,
        started_at: parse_datetime(&started_str)?,
        completed_at: parse_optional_datetime(completed_str)?,
        listed: to_u32(row.get("listed"), "listed")?,
        uploaded: to_u32(row.get("uploaded"), "uploaded")?,
        skipped: to_u32(row.get("skipped"), "skipped")?,
        failed: to_u32(row.get("failed"), "failed")?,
        outcome: run_outcome_from_string(&outcome_str)?,
    })
}

// ============================================================================
// ILedger implementation
// ============================================================================

#[async_trait::async_trait]
impl ILedger for SqliteLedger {
    async fn lookup(&self, file_id: &FileId) -> anyhow::Result<Option<SyncRecord>> {
        let row = sqlx::query("SELECT * FROM sync_records WHERE file_id = ?")
            .bind(file_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(record_from_row(r)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, record: &SyncRecord) -> anyhow::Result<()> {
        let remote_id = record.remote_id().map(|r| r.as_str().to_string());
        let synced_at = record.synced_at().map(|dt| dt.to_rfc3339());

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT OR REPLACE INTO sync_records \
             (file_id, file_name, course, status, remote_id, synced_at, \
              last_error, attempts, first_seen_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.file_id().as_str())
        .bind(record.file_name())
        .bind(record.course())
        .bind(record.status().as_str())
        .bind(&remote_id)
        .bind(&synced_at)
        .bind(record.last_error())
        .bind(record.attempts() as i64)
        .bind(record.first_seen_at().to_rfc3339())
        .bind(record.updated_at().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::trace!(
            file_id = %record.file_id(),
            status = record.status().as_str(),
            "Ledger record written"
        );
        Ok(())
    }

    async fn all_ids(&self) -> anyhow::Result<HashSet<FileId>> {
        let rows = sqlx::query("SELECT file_id FROM sync_records")
            .fetch_all(&self.pool)
            .await?;

        let mut ids = HashSet::with_capacity(rows.len());
        for row in &rows {
            let id: String = row.get("file_id");
            ids.insert(FileId::new(id)?);
        }
        Ok(ids)
    }

    async fn list(&self, filter: &RecordFilter) -> anyhow::Result<Vec<SyncRecord>> {
        let mut sql = String::from("SELECT * FROM sync_records");
        let mut binds: Vec<String> = Vec::new();

        if !filter.is_empty() {
            let mut clauses: Vec<&str> = Vec::new();
            if let Some(status) = filter.status {
                clauses.push("status = ?");
                binds.push(status.as_str().to_string());
            }
            if let Some(ref course) = filter.course {
                clauses.push("course = ?");
                binds.push(course.clone());
            }
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        sql.push_str(" ORDER BY file_id");

        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }

        let rows = query.fetch_all(&self.pool).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            records.push(record_from_row(row)?);
        }
        Ok(records)
    }

    async fn count_by_status(&self) -> anyhow::Result<HashMap<SyncStatus, u64>> {
        let rows =
            sqlx::query("SELECT status, COUNT(*) as count FROM sync_records GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = HashMap::new();
        for row in &rows {
            let status_str: String = row.get("status");
            let count: i64 = row.get("count");
            let status = SyncStatus::from_str(&status_str)?;
            counts.insert(status, count as u64);
        }
        Ok(counts)
    }

    async fn save_run(&self, run: &SyncRun) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO sync_runs \
             (id, started_at, completed_at, listed, uploaded, skipped, failed, outcome) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(run.id.to_string())
        .bind(run.started_at.to_rfc3339())
        .bind(run.completed_at.map(|dt| dt.to_rfc3339()))
        .bind(run.listed as i64)
        .bind(run.uploaded as i64)
        .bind(run.skipped as i64)
        .bind(run.failed as i64)
        .bind(run_outcome_to_string(&run.outcome))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn last_run(&self) -> anyhow::Result<Option<SyncRun>> {
        let row = sqlx::query("SELECT * FROM sync_runs ORDER BY started_at DESC, rowid DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(run_from_row(r)?)),
            None => Ok(None),
        }
    }
}
