//! CourseSync Drive - Google Drive v3 client
//!
//! Provides async client for:
//! - Folder lookup and creation (`files.list` / `files.create`)
//! - Resumable uploads (`uploadType=resumable`)
//!
//! ## Modules
//!
//! - [`client`] - Authenticated HTTP client with timeouts and status mapping
//! - [`folders`] - Find-or-create folders by name under a parent
//! - [`upload`] - Resumable upload session handling
//! - [`provider`] - `IRemoteStore` adapter over the modules above

pub mod client;
pub mod folders;
pub mod provider;
pub mod upload;

pub use client::DriveClient;
pub use provider::DriveRemoteStore;

use thiserror::Error;

/// Errors that can occur when communicating with the Google Drive API
#[derive(Debug, Error)]
pub enum DriveError {
    /// No access token was configured
    #[error("Missing access token: set drive.access_token or DRIVE_ACCESS_TOKEN")]
    MissingToken,

    /// The access token is invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions or quota exceeded
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The parent folder or upload session does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Any other non-success status
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
