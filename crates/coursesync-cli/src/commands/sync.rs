//! Sync command - Upload new Moodle course files to Google Drive
//!
//! Provides the `coursesync sync` CLI command which:
//! 1. Validates the resolved configuration
//! 2. Creates the adapters (Moodle, Drive, SQLite ledger)
//! 3. Runs one SyncCoursesUseCase pass, or only plans it with `--dry-run`
//! 4. Displays the report; per-file failures make the command fail

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use coursesync_core::config::Config;
use coursesync_core::domain::SyncError;
use coursesync_core::usecases::{PlanReason, PlannedUpload, SyncCoursesUseCase, SyncOptions, SyncReport};
use coursesync_drive::{DriveClient, DriveRemoteStore};
use coursesync_portal::{MoodleClient, MoodlePortalLister};
use tracing::info;

use super::{open_ledger, CliContext};
use crate::output::{format_duration_ms, plural, OutputFormatter};

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Show what would be uploaded without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncCommand {
    /// Wires up all adapters, runs the use case and displays the result.
    pub async fn execute(&self, ctx: &CliContext, config: Config) -> Result<()> {
        let formatter = ctx.formatter();

        let errors = config.validate();
        if !errors.is_empty() {
            for error in &errors {
                formatter.error(&error.to_string());
            }
            return Err(SyncError::Configuration(format!(
                "{} in {}",
                plural(errors.len() as u32, "invalid setting"),
                ctx.config_path.display()
            ))
            .into());
        }

        info!(config_path = %ctx.config_path.display(), "Loaded configuration");

        let portal_client =
            MoodleClient::from_config(&config.portal).context("Failed to set up portal client")?;
        let drive_client =
            DriveClient::from_config(&config.drive).context("Failed to set up Drive client")?;
        let options = SyncOptions::from_config(&config.drive)?;

        let (pool, ledger) = open_ledger(&config).await?;

        let use_case = SyncCoursesUseCase::new(
            Arc::new(MoodlePortalLister::new(portal_client)),
            Arc::new(DriveRemoteStore::new(drive_client)),
            ledger,
            options,
        );

        if self.dry_run {
            formatter.info("Dry run mode - no changes will be made");
            let planned = use_case.plan().await;
            pool.close().await;
            show_plan(ctx, &*formatter, &planned?)?;
            return Ok(());
        }

        formatter.info("Starting synchronization...");
        let result = use_case.run().await;
        pool.close().await;
        let report = result?;

        show_report(ctx, &*formatter, &report)?;

        if report.has_failures() {
            bail!(
                "{} could not be synced; they will be retried on the next run",
                plural(report.failed, "file")
            );
        }
        Ok(())
    }
}

fn reason_label(reason: PlanReason) -> &'static str {
    match reason {
        PlanReason::New => "new",
        PlanReason::RetryFailed => "retry after failure",
        PlanReason::RetryPending => "retry unfinished",
    }
}

fn show_plan(ctx: &CliContext, formatter: &dyn OutputFormatter, planned: &[PlannedUpload]) -> Result<()> {
    if ctx.is_json() {
        let json = serde_json::json!({
            "dry_run": true,
            "planned": serde_json::to_value(planned).context("Failed to serialize plan")?,
        });
        formatter.print_json(&json);
        return Ok(());
    }

    if planned.is_empty() {
        formatter.success("Already up to date");
        return Ok(());
    }

    formatter.success(&format!(
        "{} would be uploaded",
        plural(planned.len() as u32, "file")
    ));
    for item in planned {
        let course = item.entry.course.as_deref().unwrap_or("(no course)");
        formatter.info(&format!(
            "{} / {} ({})",
            course,
            item.entry.file_name,
            reason_label(item.reason)
        ));
    }
    Ok(())
}

fn show_report(ctx: &CliContext, formatter: &dyn OutputFormatter, report: &SyncReport) -> Result<()> {
    if ctx.is_json() {
        let json = serde_json::to_value(report).context("Failed to serialize sync report")?;
        formatter.print_json(&json);
        return Ok(());
    }

    let duration = format_duration_ms(report.duration_ms);
    if report.uploaded == 0 && report.failed == 0 {
        formatter.success(&format!("Already up to date ({})", duration));
    } else {
        formatter.success(&format!("Sync completed in {}", duration));
    }

    formatter.info(&format!("Listed:   {}", plural(report.listed, "file")));
    if report.uploaded > 0 {
        formatter.info(&format!("Uploaded: {}", plural(report.uploaded, "file")));
    }
    if report.skipped > 0 {
        formatter.info(&format!("Skipped:  {} (already in Drive)", plural(report.skipped, "file")));
    }
    if report.renamed > 0 {
        formatter.info(&format!("Renamed:  {}", plural(report.renamed, "file")));
    }

    if !report.failures.is_empty() {
        formatter.error(&format!(
            "{} occurred:",
            plural(report.failures.len() as u32, "error")
        ));
        for failure in &report.failures {
            formatter.info(&format!(
                "  - {} [{}]: {}",
                failure.file_name,
                failure.kind.name(),
                failure.message
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_invalid_config_aborts_before_any_adapter() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.ledger.path = dir.path().join("ledger.db");

        let ctx = CliContext::new(OutputFormat::Json, true, PathBuf::from("/nonexistent.yaml"));
        let err = SyncCommand { dry_run: false }
            .execute(&ctx, config)
            .await
            .unwrap_err();

        let sync_err = err.downcast_ref::<SyncError>().expect("configuration error");
        assert!(matches!(sync_err, SyncError::Configuration(_)));
        assert!(!dir.path().join("ledger.db").exists());
    }

    #[test]
    fn test_reason_labels_are_distinct() {
        let labels = [
            reason_label(PlanReason::New),
            reason_label(PlanReason::RetryFailed),
            reason_label(PlanReason::RetryPending),
        ];
        assert_ne!(labels[0], labels[1]);
        assert_ne!(labels[1], labels[2]);
    }
}
