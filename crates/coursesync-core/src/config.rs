//! Configuration module for CourseSync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, environment overrides, validation, defaults, and a builder
//! pattern for programmatic use.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::FolderRef;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for CourseSync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub portal: PortalConfig,
    pub drive: DriveConfig,
    pub ledger: LedgerConfig,
    pub logging: LoggingConfig,
}

/// Learning portal (Moodle) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Full URL of the portal's login page.
    pub login_url: String,
    /// Path of the page listing enrolled courses, relative to the site root.
    /// The site root is the part of `login_url` before `/login/`, so sites
    /// installed under a sub-path resolve correctly.
    pub dashboard_path: String,
    pub username: Option<String>,
    /// Usually supplied through `MOODLE_PASSWORD` rather than the file.
    pub password: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Google Drive destination settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// OAuth2 bearer token. Usually supplied through `DRIVE_ACCESS_TOKEN`.
    pub access_token: Option<String>,
    /// ID of the destination root folder. When unset, the folder named
    /// `root_folder_name` is found or created at the top of the drive.
    pub root_folder_id: Option<String>,
    pub root_folder_name: String,
    /// Upload each file into a sub-folder named after its course.
    pub per_course_folders: bool,
    pub api_base_url: String,
    pub upload_base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Local ledger settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Path to the SQLite ledger database.
    pub path: PathBuf,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load the effective configuration for a run.
    ///
    /// A missing file yields the defaults; a file that exists but cannot be
    /// parsed is an error. Values from the process environment (and a `.env`
    /// file in the working directory, if present) override the file.
    pub fn resolve(path: &Path) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = if path.exists() {
            Self::load(path)
                .with_context(|| format!("Failed to parse configuration file {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/coursesync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("coursesync")
            .join("config.yaml")
    }

    /// Overrides fields from environment variables looked up through `env`.
    ///
    /// Recognised variables: `MOODLE_LOGIN_URL`, `MOODLE_USERNAME`,
    /// `MOODLE_PASSWORD`, `DRIVE_ACCESS_TOKEN`, `DRIVE_ROOT`,
    /// `DRIVE_ROOT_FOLDER_ID`, `SYNC_DB`. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("MOODLE_LOGIN_URL") {
            self.portal.login_url = v;
        }
        if let Some(v) = get("MOODLE_USERNAME") {
            self.portal.username = Some(v);
        }
        if let Some(v) = get("MOODLE_PASSWORD") {
            self.portal.password = Some(v);
        }
        if let Some(v) = get("DRIVE_ACCESS_TOKEN") {
            self.drive.access_token = Some(v);
        }
        if let Some(v) = get("DRIVE_ROOT") {
            self.drive.root_folder_name = v;
        }
        if let Some(v) = get("DRIVE_ROOT_FOLDER_ID") {
            self.drive.root_folder_id = Some(v);
        }
        if let Some(v) = get("SYNC_DB") {
            self.ledger.path = PathBuf::from(v);
        }
    }

    /// Returns a copy with credentials masked, for display.
    pub fn redacted(&self) -> Self {
        const MASK: &str = "********";
        let mut copy = self.clone();
        if copy.portal.password.is_some() {
            copy.portal.password = Some(MASK.to_string());
        }
        if copy.drive.access_token.is_some() {
            copy.drive.access_token = Some(MASK.to_string());
        }
        copy
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            login_url: String::new(),
            dashboard_path: "/my/".to_string(),
            username: None,
            password: None,
            request_timeout_secs: 30,
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            root_folder_id: None,
            root_folder_name: "Moodle Sync".to_string(),
            per_course_folders: true,
            api_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            upload_base_url: "https://www.googleapis.com/upload/drive/v3".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("coursesync")
                .join("ledger.db"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"portal.login_url"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn check_http_url(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.trim().is_empty() {
        errors.push(ValidationError {
            field: field.into(),
            message: "must be set".into(),
        });
        return;
    }
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        Ok(parsed) => errors.push(ValidationError {
            field: field.into(),
            message: format!("unsupported scheme '{}'", parsed.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field: field.into(),
            message: format!("invalid URL '{}': {}", value, e),
        }),
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- portal ---
        check_http_url("portal.login_url", &self.portal.login_url, &mut errors);
        if !self.portal.dashboard_path.starts_with('/') {
            errors.push(ValidationError {
                field: "portal.dashboard_path".into(),
                message: "must start with '/'".into(),
            });
        }
        if is_blank(&self.portal.username) {
            errors.push(ValidationError {
                field: "portal.username".into(),
                message: "must be set (or MOODLE_USERNAME)".into(),
            });
        }
        if is_blank(&self.portal.password) {
            errors.push(ValidationError {
                field: "portal.password".into(),
                message: "must be set (or MOODLE_PASSWORD)".into(),
            });
        }
        if self.portal.request_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "portal.request_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- drive ---
        if is_blank(&self.drive.access_token) {
            errors.push(ValidationError {
                field: "drive.access_token".into(),
                message: "must be set (or DRIVE_ACCESS_TOKEN)".into(),
            });
        }
        match &self.drive.root_folder_id {
            Some(id) => {
                if FolderRef::new(id.clone()).is_err() {
                    errors.push(ValidationError {
                        field: "drive.root_folder_id".into(),
                        message: format!("invalid folder ID '{}'", id),
                    });
                }
            }
            None => {
                if self.drive.root_folder_name.trim().is_empty() {
                    errors.push(ValidationError {
                        field: "drive.root_folder_name".into(),
                        message: "must be set when drive.root_folder_id is not".into(),
                    });
                }
            }
        }
        check_http_url("drive.api_base_url", &self.drive.api_base_url, &mut errors);
        check_http_url("drive.upload_base_url", &self.drive.upload_base_url, &mut errors);
        if self.drive.request_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "drive.request_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- ledger ---
        if self.ledger.path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "ledger.path".into(),
                message: "must be set".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use coursesync_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .portal_login_url("https://moodle.example.edu/login/index.php")
///     .portal_credentials("student", "secret")
///     .drive_access_token("ya29.token")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- portal ---

    pub fn portal_login_url(mut self, url: impl Into<String>) -> Self {
        self.config.portal.login_url = url.into();
        self
    }

    pub fn portal_dashboard_path(mut self, path: impl Into<String>) -> Self {
        self.config.portal.dashboard_path = path.into();
        self
    }

    pub fn portal_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.config.portal.username = Some(username.into());
        self.config.portal.password = Some(password.into());
        self
    }

    pub fn portal_request_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.portal.request_timeout_secs = seconds;
        self
    }

    // --- drive ---

    pub fn drive_access_token(mut self, token: impl Into<String>) -> Self {
        self.config.drive.access_token = Some(token.into());
        self
    }

    pub fn drive_root_folder_id(mut self, id: impl Into<String>) -> Self {
        self.config.drive.root_folder_id = Some(id.into());
        self
    }

    pub fn drive_root_folder_name(mut self, name: impl Into<String>) -> Self {
        self.config.drive.root_folder_name = name.into();
        self
    }

    pub fn drive_per_course_folders(mut self, enabled: bool) -> Self {
        self.config.drive.per_course_folders = enabled;
        self
    }

    pub fn drive_base_urls(mut self, api: impl Into<String>, upload: impl Into<String>) -> Self {
        self.config.drive.api_base_url = api.into();
        self.config.drive.upload_base_url = upload.into();
        self
    }

    // --- ledger ---

    pub fn ledger_path(mut self, path: PathBuf) -> Self {
        self.config.ledger.path = path;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
