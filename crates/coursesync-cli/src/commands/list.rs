//! List command - Print ledger records
//!
//! `coursesync list [--status S] [--course C]` prints one line per record,
//! ordered by file ID.

use anyhow::{Context, Result};
use clap::Args;
use coursesync_core::config::Config;
use coursesync_core::domain::{SyncRecord, SyncStatus};
use coursesync_core::ports::{ILedger, RecordFilter};

use super::{open_existing_ledger, CliContext};
use crate::output::plural;

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only records in this status (pending, uploaded, failed)
    #[arg(long)]
    pub status: Option<String>,

    /// Only records of this course
    #[arg(long)]
    pub course: Option<String>,
}

impl ListCommand {
    fn filter(&self) -> Result<RecordFilter> {
        let mut filter = RecordFilter::new();
        if let Some(ref raw) = self.status {
            let status: SyncStatus = raw.parse().context("Invalid --status value")?;
            filter = filter.with_status(status);
        }
        if let Some(ref course) = self.course {
            filter = filter.with_course(course.clone());
        }
        Ok(filter)
    }

    pub async fn execute(&self, ctx: &CliContext, config: Config) -> Result<()> {
        let formatter = ctx.formatter();
        let filter = self.filter()?;

        let Some((pool, ledger)) = open_existing_ledger(&config).await? else {
            if ctx.is_json() {
                formatter.print_json(&serde_json::json!([]));
            } else {
                formatter.error("No ledger found. Run 'coursesync sync' first.");
            }
            return Ok(());
        };

        let records = ledger.list(&filter).await;
        pool.close().await;
        let records = records.context("Failed to list records")?;

        if ctx.is_json() {
            let json = serde_json::to_value(&records).context("Failed to serialize records")?;
            formatter.print_json(&json);
            return Ok(());
        }

        if records.is_empty() {
            formatter.info("No records");
            return Ok(());
        }

        formatter.success(&plural(records.len() as u32, "record"));
        for record in &records {
            formatter.info(&record_line(record));
        }
        Ok(())
    }
}

fn record_line(record: &SyncRecord) -> String {
    let mut line = format!(
        "[{:<8}] {} / {}",
        record.status().name(),
        record.course().unwrap_or("-"),
        record.file_name()
    );
    if let Some(error) = record.last_error() {
        line.push_str(&format!(" ({})", error));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursesync_core::domain::FileId;

    #[test]
    fn test_filter_from_flags() {
        let cmd = ListCommand {
            status: Some("FAILED".into()),
            course: Some("Algebra".into()),
        };
        let filter = cmd.filter().unwrap();
        assert_eq!(filter.status, Some(SyncStatus::Failed));
        assert_eq!(filter.course.as_deref(), Some("Algebra"));

        let cmd = ListCommand {
            status: None,
            course: None,
        };
        assert!(cmd.filter().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let cmd = ListCommand {
            status: Some("synced".into()),
            course: None,
        };
        assert!(cmd.filter().is_err());
    }

    #[test]
    fn test_record_line_includes_error() {
        let mut record = SyncRecord::new_pending(
            FileId::new("https://moodle.test/mod/resource/view.php?id=4".into()).unwrap(),
            "notes.pdf",
            Some("Physics".into()),
        );
        record.mark_failed("Drive returned 503").unwrap();
        assert_eq!(
            record_line(&record),
            "[Failed  ] Physics / notes.pdf (Drive returned 503)"
        );
    }

    #[tokio::test]
    async fn test_missing_ledger_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.ledger.path = dir.path().join("ledger.db");

        let ctx = CliContext::new(
            crate::output::OutputFormat::Json,
            true,
            dir.path().join("config.yaml"),
        );
        ListCommand {
            status: None,
            course: None,
        }
        .execute(&ctx, config)
        .await
        .unwrap();

        assert!(!dir.path().join("ledger.db").exists());
    }
}
