//! CourseSync CLI - Mirror Moodle course files into Google Drive
//!
//! Provides commands for:
//! - Running a sync pass (or previewing it with `--dry-run`)
//! - Viewing ledger status and run history
//! - Listing ledger records
//! - Showing and validating configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use coursesync_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    config::ConfigCommand, list::ListCommand, status::StatusCommand, sync::SyncCommand, CliContext,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "coursesync",
    version,
    about = "Mirror Moodle course files into Google Drive"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload new course files to Drive
    Sync(SyncCommand),
    /// Show ledger counts and the last run
    Status(StatusCommand),
    /// List ledger records
    List(ListCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Log level when `RUST_LOG` is not set
fn log_level(verbose: u8, quiet: bool, config: Option<&Config>) -> String {
    match verbose {
        0 if quiet => "warn".to_string(),
        0 => config
            .map(|c| c.logging.level.clone())
            .unwrap_or_else(|| "info".to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::resolve(&config_path);

    // Setup tracing
    let level = log_level(cli.verbose, cli.quiet, config.as_ref().ok());
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Resolved before the subscriber existed, so report it now
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No configuration file, using defaults");
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = CliContext::new(format, cli.quiet, config_path);

    match cli.command {
        Commands::Sync(cmd) => cmd.execute(&ctx, config?).await,
        Commands::Status(cmd) => cmd.execute(&ctx, config?).await,
        Commands::List(cmd) => cmd.execute(&ctx, config?).await,
        Commands::Config(cmd) => cmd.execute(&ctx, config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sync_dry_run_with_global_flags() {
        let cli = Cli::try_parse_from(["coursesync", "sync", "--dry-run", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Sync(cmd) => assert!(cmd.dry_run),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_status_filter() {
        let cli = Cli::try_parse_from(["coursesync", "list", "--status", "failed"]).unwrap();
        match cli.command {
            Commands::List(cmd) => assert_eq!(cmd.status.as_deref(), Some("failed")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_path() {
        let cli =
            Cli::try_parse_from(["coursesync", "--config", "/tmp/cs.yaml", "config", "validate"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/cs.yaml")));
        assert!(matches!(cli.command, Commands::Config(ConfigCommand::Validate)));
    }

    #[test]
    fn test_log_level_precedence() {
        let mut config = Config::default();
        config.logging.level = "warn".into();

        assert_eq!(log_level(0, false, Some(&config)), "warn");
        assert_eq!(log_level(0, false, None), "info");
        assert_eq!(log_level(1, false, Some(&config)), "debug");
        assert_eq!(log_level(3, false, None), "trace");
        assert_eq!(log_level(0, true, None), "warn");
    }
}
