//! MoodlePortalLister - IPortalLister implementation for Moodle
//!
//! ## Design Notes
//!
//! - `file_id` is the absolute resource URL. Moodle keeps `view.php?id=N`
//!   stable across renames, so a renamed file keeps its identity.
//! - The listing is built in dashboard order, course by course. Any page
//!   failure fails the whole listing: a partial listing would look like
//!   "no new files" for the missing courses.
//! - Login happens at most once per lister; `fetch` reuses the session.

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use coursesync_core::domain::FileId;
use coursesync_core::ports::{FetchHandle, IPortalLister, PortalEntry};

use crate::client::{self, MoodleClient};
use crate::scrape;

/// Moodle adapter for the `IPortalLister` port
pub struct MoodlePortalLister {
    client: MoodleClient,
    logged_in: Mutex<bool>,
}

impl MoodlePortalLister {
    /// Creates a new lister; no request is made until the first listing
    pub fn new(client: MoodleClient) -> Self {
        Self {
            client,
            logged_in: Mutex::new(false),
        }
    }

    async fn ensure_session(&self) -> Result<()> {
        let mut logged_in = self.logged_in.lock().await;
        if !*logged_in {
            self.client.login().await.context("Portal login failed")?;
            *logged_in = true;
        }
        Ok(())
    }

    /// Enrolled course URLs from the dashboard, de-duplicated in page order
    async fn course_urls(&self) -> Result<Vec<Url>> {
        let dashboard = self.client.dashboard_url();
        let html = self
            .client
            .get_page(dashboard)
            .await
            .context("Failed to load course dashboard")?;

        let mut urls: Vec<Url> = Vec::new();
        for link in scrape::course_links(&html) {
            match client::resolve(dashboard, &link.href) {
                Ok(url) if !urls.contains(&url) => urls.push(url),
                Ok(_) => {}
                Err(e) => warn!(href = %link.href, error = %e, "Skipping unparsable course link"),
            }
        }
        Ok(urls)
    }

    async fn course_entries(&self, course_url: &Url) -> Result<Vec<PortalEntry>> {
        let html = self
            .client
            .get_page(course_url)
            .await
            .with_context(|| format!("Failed to load course page {}", course_url))?;

        let course = scrape::page_heading(&html);
        if course.is_none() {
            debug!(url = %course_url, "Course page has no heading");
        }

        let mut entries = Vec::new();
        for link in scrape::resource_links(&html) {
            let url = match client::resolve(course_url, &link.href) {
                Ok(url) => url,
                Err(e) => {
                    warn!(href = %link.href, error = %e, "Skipping unparsable resource link");
                    continue;
                }
            };
            let file_name = if link.text.is_empty() {
                fallback_name(&url)
            } else {
                link.text
            };
            entries.push(PortalEntry {
                file_id: FileId::new(url.to_string())?,
                file_name,
                course: course.clone(),
                handle: FetchHandle::new(url.to_string()),
            });
        }

        debug!(
            url = %course_url,
            course = course.as_deref().unwrap_or("-"),
            files = entries.len(),
            "Scraped course page"
        );
        Ok(entries)
    }
}

/// Name for a resource whose anchor has no visible text
fn fallback_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map(|s| match url.query() {
            Some(q) => format!("{}?{}", s, q),
            None => s.to_string(),
        })
        .unwrap_or_else(|| url.to_string())
}

#[async_trait::async_trait]
impl IPortalLister for MoodlePortalLister {
    async fn list_course_files(&self) -> Result<Vec<PortalEntry>> {
        self.ensure_session().await?;

        let courses = self.course_urls().await?;
        info!(courses = courses.len(), "Enrolled courses found");

        let mut entries = Vec::new();
        for course_url in &courses {
            entries.extend(self.course_entries(course_url).await?);
        }
        Ok(entries)
    }

    async fn fetch(&self, handle: &FetchHandle) -> Result<Vec<u8>> {
        self.ensure_session().await?;
        let url = client::parse_url(handle.as_str())?;
        let data = self
            .client
            .download(&url)
            .await
            .with_context(|| format!("Failed to download {}", url))?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_name() {
        let url = Url::parse("https://moodle.test/pluginfile.php/12/mod_resource/content/1/notes.pdf")
            .unwrap();
        assert_eq!(fallback_name(&url), "notes.pdf");

        let url = Url::parse("https://moodle.test/mod/resource/view.php?id=7").unwrap();
        assert_eq!(fallback_name(&url), "view.php?id=7");

        let url = Url::parse("https://moodle.test/").unwrap();
        assert_eq!(fallback_name(&url), "https://moodle.test/");
    }
}
