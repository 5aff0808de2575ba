//! CourseSync Portal - Moodle course file lister
//!
//! Speaks plain HTTP to a Moodle site:
//! - Username/password login with the `logintoken` form field and a cookie session
//! - Enrolled course discovery from the dashboard (`a.course-link`)
//! - Resource discovery on each course page (`<h1>` title, `a.resource` anchors)
//! - Resource download through the same session
//!
//! ## Modules
//!
//! - [`client`] - Session-holding HTTP client
//! - [`scrape`] - HTML extraction helpers
//! - [`provider`] - `IPortalLister` adapter

pub mod client;
pub mod provider;
pub mod scrape;

pub use client::MoodleClient;
pub use provider::MoodlePortalLister;

use thiserror::Error;

/// Errors that can occur when talking to the Moodle portal
#[derive(Debug, Error)]
pub enum PortalError {
    /// Username or password is not configured
    #[error("Missing portal credentials: set MOODLE_USERNAME and MOODLE_PASSWORD")]
    MissingCredentials,

    /// A configured or scraped URL could not be parsed
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The portal sent us back to the login page after posting credentials
    #[error("Login rejected for user '{0}'")]
    LoginRejected(String),

    /// A request was redirected to the login page
    #[error("Session expired while requesting {0}")]
    SessionExpired(String),

    /// Non-success HTTP status
    #[error("HTTP {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
