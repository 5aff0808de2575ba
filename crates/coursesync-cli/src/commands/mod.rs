//! CLI subcommands
//!
//! Every command receives a [`CliContext`] with the global flags and the
//! resolved configuration path.

pub mod config;
pub mod list;
pub mod status;
pub mod sync;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use coursesync_cache::{DatabasePool, SqliteLedger};
use coursesync_core::config::Config;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// Global options shared by all commands
#[derive(Debug, Clone)]
pub struct CliContext {
    pub format: OutputFormat,
    pub quiet: bool,
    /// Configuration file in effect (it may not exist)
    pub config_path: PathBuf,
}

impl CliContext {
    pub fn new(format: OutputFormat, quiet: bool, config_path: PathBuf) -> Self {
        Self {
            format,
            quiet,
            config_path,
        }
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.format, self.quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }
}

/// Opens the ledger configured in `config`
///
/// The pool is returned alongside the ledger so the caller can close it
/// and flush the WAL before exiting.
pub async fn open_ledger(config: &Config) -> Result<(DatabasePool, Arc<SqliteLedger>)> {
    let pool = DatabasePool::new(&config.ledger.path)
        .await
        .with_context(|| format!("Failed to open ledger {}", config.ledger.path.display()))?;
    let ledger = Arc::new(SqliteLedger::new(pool.pool().clone()));
    Ok((pool, ledger))
}

/// Opens the ledger only if its file already exists
///
/// Read-only commands use this so they never create an empty ledger.
pub async fn open_existing_ledger(
    config: &Config,
) -> Result<Option<(DatabasePool, Arc<SqliteLedger>)>> {
    if !config.ledger.path.exists() {
        return Ok(None);
    }
    open_ledger(config).await.map(Some)
}
