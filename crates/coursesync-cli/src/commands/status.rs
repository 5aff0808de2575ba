//! Status command - Display ledger status
//!
//! Provides the `coursesync status` CLI command which:
//! 1. Shows record counts by status and the last run
//! 2. Lists files whose last upload attempt failed
//! 3. Shows a single record when a file ID is given

use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::Args;
use coursesync_core::config::Config;
use coursesync_core::domain::{FileId, RunOutcome, SyncRecord, SyncRun, SyncStatus};
use coursesync_core::ports::{ILedger, RecordFilter};
use tracing::info;

use super::{open_existing_ledger, CliContext};
use crate::output::{format_duration_ms, plural, OutputFormatter};

#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Show the record of a single portal file ID
    pub file_id: Option<String>,
}

impl StatusCommand {
    pub async fn execute(&self, ctx: &CliContext, config: Config) -> Result<()> {
        let formatter = ctx.formatter();

        let Some((pool, ledger)) = open_existing_ledger(&config).await? else {
            formatter.error("No ledger found. Run 'coursesync sync' first.");
            return Ok(());
        };

        let result = match self.file_id {
            Some(ref raw) => show_record(ctx, &*formatter, &*ledger, raw).await,
            None => show_global_status(ctx, &*formatter, &*ledger).await,
        };
        pool.close().await;
        result
    }
}

async fn show_global_status(
    ctx: &CliContext,
    formatter: &dyn OutputFormatter,
    ledger: &dyn ILedger,
) -> Result<()> {
    let counts = ledger
        .count_by_status()
        .await
        .context("Failed to count records by status")?;
    let last_run = ledger.last_run().await.context("Failed to read run history")?;
    let failed = ledger
        .list(&RecordFilter::new().with_status(SyncStatus::Failed))
        .await
        .context("Failed to query failed records")?;

    let total: u64 = counts.values().sum();
    info!(total, "Showing ledger status");

    if ctx.is_json() {
        let by_status: HashMap<&str, u64> = SyncStatus::ALL
            .iter()
            .map(|s| (s.as_str(), counts.get(s).copied().unwrap_or(0)))
            .collect();
        let json = serde_json::json!({
            "total_records": total,
            "records_by_status": by_status,
            "last_run": last_run,
            "failed": failed,
        });
        formatter.print_json(&json);
        return Ok(());
    }

    formatter.success("CourseSync Status");
    formatter.info("");
    formatter.info(&last_run_line(last_run.as_ref()));
    formatter.info(&format!("Total records: {}", total));
    formatter.info("");

    formatter.info("Status     Count");
    formatter.info("---------- -----");
    for status in SyncStatus::ALL {
        let count = counts.get(&status).copied().unwrap_or(0);
        formatter.info(&format!("{:<10} {}", status.name(), count));
    }

    if !failed.is_empty() {
        formatter.info("");
        formatter.error(&format!(
            "{} failed and will be retried:",
            plural(failed.len() as u32, "file")
        ));
        for record in &failed {
            formatter.info(&format!(
                "  {} - {}",
                truncate(record.file_name(), 50),
                record.last_error().unwrap_or("Unknown error")
            ));
        }
    }

    Ok(())
}

async fn show_record(
    ctx: &CliContext,
    formatter: &dyn OutputFormatter,
    ledger: &dyn ILedger,
    raw_id: &str,
) -> Result<()> {
    let file_id = FileId::new(raw_id.to_string()).context("Invalid file ID")?;
    let record = ledger
        .lookup(&file_id)
        .await
        .context("Failed to look up record")?;

    let Some(record) = record else {
        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({ "file_id": raw_id, "record": null }));
        } else {
            formatter.warn(&format!("No record for {}", raw_id));
        }
        return Ok(());
    };

    if ctx.is_json() {
        let json = serde_json::to_value(&record).context("Failed to serialize record")?;
        formatter.print_json(&json);
        return Ok(());
    }

    print_record(formatter, &record);
    Ok(())
}

fn print_record(formatter: &dyn OutputFormatter, record: &SyncRecord) {
    formatter.success(&format!("{} ({})", record.file_name(), record.status().name()));
    formatter.info(&format!("File ID:    {}", record.file_id()));
    formatter.info(&format!("Course:     {}", record.course().unwrap_or("-")));
    formatter.info(&format!(
        "Remote ID:  {}",
        record.remote_id().map(|r| r.to_string()).unwrap_or_else(|| "-".into())
    ));
    formatter.info(&format!(
        "Synced at:  {}",
        record
            .synced_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".into())
    ));
    formatter.info(&format!("Attempts:   {}", record.attempts()));
    formatter.info(&format!(
        "First seen: {}",
        record.first_seen_at().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(error) = record.last_error() {
        formatter.info(&format!("Last error: {}", error));
    }
}

fn last_run_line(run: Option<&SyncRun>) -> String {
    let Some(run) = run else {
        return "Last run: Never".to_string();
    };
    let started = run.started_at.format("%Y-%m-%d %H:%M:%S UTC");
    match &run.outcome {
        RunOutcome::Completed => {
            let duration = run
                .duration()
                .map(|d| format_duration_ms(d.num_milliseconds().max(0) as u64))
                .unwrap_or_default();
            format!(
                "Last run: {} ({}, {} uploaded, {} failed)",
                started, duration, run.uploaded, run.failed
            )
        }
        RunOutcome::Aborted(reason) => format!("Last run: {} (aborted: {})", started, reason),
        RunOutcome::Running => format!("Last run: {} (did not finish)", started),
    }
}

/// Shortens `s` to at most `max` characters, keeping the end
fn truncate(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        return s.to_string();
    }
    let tail: String = s.chars().skip(count - (max - 3)).collect();
    format!("...{}", tail)
}
