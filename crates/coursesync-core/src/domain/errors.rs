//! Domain error types
//!
//! This module defines error types specific to domain operations
//! (validation failures, invalid state transitions) and the error taxonomy
//! the sync orchestrator uses to classify failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid portal file identifier
    #[error("Invalid file ID: {0}")]
    InvalidFileId(String),

    /// Invalid remote ID format
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// Invalid destination folder reference
    #[error("Invalid folder reference: {0}")]
    InvalidFolderRef(String),

    /// Invalid state transition attempt
    #[error("Invalid state transition from {from} to {to}")]
    InvalidState {
        /// The current state
        from: String,
        /// The attempted target state
        to: String,
    },

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}

/// Failure classes of a sync run
///
/// Per-file classes (`TransientFetch`, `Persistence`) are recorded and the
/// run continues. Run-level classes (`Configuration`, `Listing`) abort the
/// run before any file is processed.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A portal or remote-store call failed (network, auth expiry, rate limit)
    #[error("Transient fetch error: {0:#}")]
    TransientFetch(anyhow::Error),

    /// A ledger read or write failed
    #[error("Persistence error: {0:#}")]
    Persistence(anyhow::Error),

    /// External configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The portal listing could not be acquired
    #[error("Listing failed: {0:#}")]
    Listing(anyhow::Error),
}

impl SyncError {
    /// Returns the classification of this error
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            SyncError::TransientFetch(_) => SyncErrorKind::TransientFetch,
            SyncError::Persistence(_) => SyncErrorKind::Persistence,
            SyncError::Configuration(_) => SyncErrorKind::Configuration,
            SyncError::Listing(_) => SyncErrorKind::Listing,
        }
    }

    /// Returns true if the error aborts the whole run
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(self, SyncError::Configuration(_) | SyncError::Listing(_))
    }
}

/// Serializable classification of a [`SyncError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncErrorKind {
    TransientFetch,
    Persistence,
    Configuration,
    Listing,
}

impl SyncErrorKind {
    /// Returns the kind name as used in reports
    pub fn name(&self) -> &'static str {
        match self {
            SyncErrorKind::TransientFetch => "transient_fetch",
            SyncErrorKind::Persistence => "persistence",
            SyncErrorKind::Configuration => "configuration",
            SyncErrorKind::Listing => "listing",
        }
    }
}
