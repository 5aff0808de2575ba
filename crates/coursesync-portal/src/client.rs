//! Moodle HTTP session
//!
//! Holds a cookie-enabled `reqwest::Client`. Logging in follows what a
//! browser does with the standard Moodle login form: fetch the page, copy
//! the hidden `logintoken`, post it back together with the credentials.
//! The `MoodleSession` cookie set along the way authenticates every later
//! request.

use std::time::Duration;

use coursesync_core::config::PortalConfig;
use reqwest::{Client, Response};
use tracing::{debug, info};
use url::Url;

use crate::{scrape, PortalError};

/// Connection establishment timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("coursesync/", env!("CARGO_PKG_VERSION"));

/// Session-holding client for one Moodle site
pub struct MoodleClient {
    client: Client,
    login_url: Url,
    dashboard_url: Url,
    username: String,
    password: String,
}

impl MoodleClient {
    /// Builds a client from the `portal` configuration section
    ///
    /// # Errors
    /// Returns `PortalError::MissingCredentials` if username or password is
    /// absent, or `PortalError::InvalidUrl` if the login URL cannot be parsed.
    pub fn from_config(config: &PortalConfig) -> Result<Self, PortalError> {
        let (username, password) = match (&config.username, &config.password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u.clone(), p.clone()),
            _ => return Err(PortalError::MissingCredentials),
        };

        let login_url = parse_url(&config.login_url)?;
        let dashboard_url = resolve(
            &site_root(&login_url),
            config.dashboard_path.trim_start_matches('/'),
        )?;

        Self::new(
            login_url,
            dashboard_url,
            username,
            password,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Creates a client for explicit URLs and credentials
    pub fn new(
        login_url: Url,
        dashboard_url: Url,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PortalError> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            login_url,
            dashboard_url,
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn dashboard_url(&self) -> &Url {
        &self.dashboard_url
    }

    /// Establishes an authenticated session
    ///
    /// # Errors
    /// Returns `PortalError::LoginRejected` if Moodle answers the credential
    /// post with the login form again.
    pub async fn login(&self) -> Result<(), PortalError> {
        debug!(url = %self.login_url, "Fetching login page");
        let page = self.get_text(&self.login_url).await?;

        let token = scrape::login_token(&page);
        if token.is_none() {
            debug!("Login page has no logintoken field, posting credentials without it");
        }

        let mut form = vec![
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];
        if let Some(ref token) = token {
            form.push(("logintoken", token.as_str()));
        }

        let response = self
            .client
            .post(self.login_url.clone())
            .form(&form)
            .send()
            .await?;
        let response = check_status(response)?;
        let landed_on = response.url().clone();
        let body = response.text().await?;

        if is_login_page(&landed_on, &self.login_url) || scrape::is_login_form(&body) {
            return Err(PortalError::LoginRejected(self.username.clone()));
        }

        info!(user = %self.username, "Logged in to portal");
        Ok(())
    }

    /// Fetches an HTML page with the session
    ///
    /// # Errors
    /// Returns `PortalError::SessionExpired` if the request was redirected
    /// to the login page.
    pub async fn get_page(&self, url: &Url) -> Result<String, PortalError> {
        debug!(url = %url, "Fetching page");
        let response = check_status(self.client.get(url.clone()).send().await?)?;
        if is_login_page(response.url(), &self.login_url) {
            return Err(PortalError::SessionExpired(url.to_string()));
        }
        Ok(response.text().await?)
    }

    /// Downloads a resource with the session, following redirects to the file
    pub async fn download(&self, url: &Url) -> Result<Vec<u8>, PortalError> {
        debug!(url = %url, "Downloading resource");
        let response = check_status(self.client.get(url.clone()).send().await?)?;
        if is_login_page(response.url(), &self.login_url) {
            return Err(PortalError::SessionExpired(url.to_string()));
        }
        let bytes = response.bytes().await?;
        debug!(url = %url, bytes = bytes.len(), "Resource downloaded");
        Ok(bytes.to_vec())
    }

    async fn get_text(&self, url: &Url) -> Result<String, PortalError> {
        let response = check_status(self.client.get(url.clone()).send().await?)?;
        Ok(response.text().await?)
    }
}

fn check_status(response: Response) -> Result<Response, PortalError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(PortalError::UnexpectedStatus {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

fn is_login_page(url: &Url, login_url: &Url) -> bool {
    url.host_str() == login_url.host_str() && url.path() == login_url.path()
}

/// Moodle installation root: everything before `/login/` in the login URL
///
/// `https://host/moodle/login/index.php` gives `https://host/moodle/`.
/// Without a `/login/` segment the host root is used.
pub fn site_root(login_url: &Url) -> Url {
    let mut root = login_url.clone();
    let path = login_url.path();
    let base = match path.find("/login/") {
        Some(idx) => &path[..=idx],
        None => "/",
    };
    root.set_path(base);
    root.set_query(None);
    root.set_fragment(None);
    root
}

/// Parses an absolute http(s) URL
pub fn parse_url(raw: &str) -> Result<Url, PortalError> {
    Url::parse(raw).map_err(|e| PortalError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Resolves a possibly relative `href` against `base`
pub fn resolve(base: &Url, href: &str) -> Result<Url, PortalError> {
    base.join(href).map_err(|e| PortalError::InvalidUrl {
        url: href.to_string(),
        reason: e.to_string(),
    })
}
