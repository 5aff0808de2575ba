//! Google Drive v3 HTTP client
//!
//! Wraps `reqwest::Client` with bearer authentication, the two Drive base
//! URLs (metadata and upload), and mapping of error statuses to
//! [`DriveError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use coursesync_drive::client::DriveClient;
//!
//! # fn example() -> Result<(), coursesync_drive::DriveError> {
//! let client = DriveClient::new("ya29.token", Duration::from_secs(120))?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use coursesync_core::config::DriveConfig;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::DriveError;

/// Base URL for Drive v3 metadata endpoints
const DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Base URL for Drive v3 media uploads
const DRIVE_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Connection establishment timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for Google Drive API calls
pub struct DriveClient {
    client: Client,
    api_base_url: String,
    upload_base_url: String,
    access_token: String,
}

impl DriveClient {
    /// Creates a client against the public Google endpoints
    ///
    /// # Arguments
    /// * `access_token` - OAuth2 access token with a Drive scope
    /// * `timeout` - Per-request timeout, covering the full upload body
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> Result<Self, DriveError> {
        Self::with_base_urls(
            access_token,
            DRIVE_API_BASE_URL,
            DRIVE_UPLOAD_BASE_URL,
            timeout,
        )
    }

    /// Creates a client with custom base URLs (useful for testing)
    pub fn with_base_urls(
        access_token: impl Into<String>,
        api_base_url: impl Into<String>,
        upload_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DriveError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            upload_base_url: upload_base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    /// Builds a client from the `drive` configuration section
    ///
    /// # Errors
    /// Returns `DriveError::MissingToken` if no access token is configured.
    pub fn from_config(config: &DriveConfig) -> Result<Self, DriveError> {
        let token = config
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(DriveError::MissingToken)?;

        Self::with_base_urls(
            token,
            config.api_base_url.clone(),
            config.upload_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Creates an authenticated request against the metadata API
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the base URL (e.g., "/files")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base_url, path);
        self.client.request(method, &url).bearer_auth(&self.access_token)
    }

    /// Creates an authenticated request against the upload API
    pub fn upload_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.upload_base_url, path);
        self.client.request(method, &url).bearer_auth(&self.access_token)
    }

    /// Creates an authenticated request to an absolute URL (e.g., a resumable session URI)
    pub fn absolute_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(&self.access_token)
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn upload_base_url(&self) -> &str {
        &self.upload_base_url
    }

    /// Passes through a successful response, otherwise maps the status and
    /// body text into a [`DriveError`]
    pub async fn check_status(response: Response) -> Result<Response, DriveError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_string());
        debug!(status = status.as_u16(), body = %body, "Drive API error response");

        Err(match status {
            StatusCode::UNAUTHORIZED => DriveError::Unauthorized(body),
            StatusCode::FORBIDDEN => DriveError::Forbidden(body),
            StatusCode::NOT_FOUND => DriveError::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => DriveError::TooManyRequests(body),
            s if s.is_server_error() => DriveError::ServerError(format!("{}: {}", s, body)),
            s => DriveError::UnexpectedStatus {
                status: s.as_u16(),
                body,
            },
        })
    }
}
