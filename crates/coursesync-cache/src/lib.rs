//! CourseSync Cache - Local ledger persistence
//!
//! SQLite-based storage for:
//! - One record per portal file ever processed (the dedup ledger)
//! - Sync run history
//!
//! ## Architecture
//!
//! This crate implements the `ILedger` port from `coursesync-core` using
//! SQLite as the storage backend. It is a driven (secondary) adapter in the
//! hexagonal architecture.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use coursesync_cache::{DatabasePool, SqliteLedger};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/home/user/.local/share/coursesync/ledger.db")).await?;
//! let ledger = SqliteLedger::new(pool.pool().clone());
//! // Use ledger as ILedger...
//! # Ok(())
//! # }
//! ```

pub mod ledger;
pub mod pool;

pub use ledger::SqliteLedger;
pub use pool::DatabasePool;

/// Errors that can occur during ledger operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to open the database
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema creation failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be mapped back to a domain type
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::QueryFailed(e.to_string())
    }
}
