//! In-memory [`PageDriver`] serving canned HTML, for tests.
//!
//! Each URL maps to one or more HTML snapshots; scrolling advances to the
//! next snapshot so infinite-scroll feeds can be simulated. Element queries
//! run real CSS selectors against the current snapshot.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scraper::{Html, Selector};

use crate::driver::{DriverError, PageDriver};

const BLANK_PAGE: &str = "<html><head></head><body></body></html>";

#[derive(Debug, Default)]
pub struct FakeDriver {
    pages: HashMap<String, Vec<String>>,
    navigation_failures: HashSet<String>,
    session_failures: HashSet<String>,
    current: Option<(String, usize)>,
    visits: Vec<String>,
    clicks: Vec<String>,
    scrolls: usize,
    released: Arc<AtomicBool>,
}

impl FakeDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` at `url`.
    #[must_use]
    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with_scrolling_page(url, vec![html.to_string()])
    }

    /// Serves `snapshots[0]` at `url`; every scroll moves to the next
    /// snapshot and stays on the last one.
    #[must_use]
    pub fn with_scrolling_page(mut self, url: &str, snapshots: Vec<String>) -> Self {
        self.pages.insert(url.to_string(), snapshots);
        self
    }

    /// Navigating to `url` fails with [`DriverError::Navigation`].
    #[must_use]
    pub fn with_navigation_failure(mut self, url: &str) -> Self {
        self.navigation_failures.insert(url.to_string());
        self
    }

    /// Navigating to `url` fails with [`DriverError::Session`].
    #[must_use]
    pub fn with_session_failure(mut self, url: &str) -> Self {
        self.session_failures.insert(url.to_string());
        self
    }

    /// Flag set once the driver is dropped.
    #[must_use]
    pub fn released_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }

    /// Every URL passed to `navigate`, in order, including failed ones.
    #[must_use]
    pub fn visits(&self) -> &[String] {
        &self.visits
    }

    #[must_use]
    pub fn clicks(&self) -> &[String] {
        &self.clicks
    }

    #[must_use]
    pub fn scroll_count(&self) -> usize {
        self.scrolls
    }

    fn snapshot(&self) -> Result<&str, DriverError> {
        let (url, idx) = self
            .current
            .as_ref()
            .ok_or_else(|| DriverError::Session("no page loaded".to_string()))?;
        Ok(self
            .pages
            .get(url)
            .and_then(|snapshots| snapshots.get(*idx))
            .map_or(BLANK_PAGE, String::as_str))
    }

    fn matches(&self, selector: &str) -> Result<usize, DriverError> {
        let parsed = Selector::parse(selector)
            .map_err(|e| DriverError::Script(format!("bad selector \"{selector}\": {e:?}")))?;
        let doc = Html::parse_document(self.snapshot()?);
        Ok(doc.select(&parsed).count())
    }
}

impl PageDriver for FakeDriver {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.visits.push(url.to_string());
        if self.session_failures.contains(url) {
            return Err(DriverError::Session(format!("browser crashed loading {url}")));
        }
        if self.navigation_failures.contains(url) {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }
        self.current = Some((url.to_string(), 0));
        Ok(())
    }

    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), DriverError> {
        if self.matches(selector)? > 0 {
            Ok(())
        } else {
            Err(DriverError::Timeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis(),
            })
        }
    }

    fn count(&mut self, selector: &str) -> Result<usize, DriverError> {
        self.matches(selector)
    }

    fn scroll_to_bottom(&mut self, _container: &str) -> Result<(), DriverError> {
        self.scrolls += 1;
        if let Some((url, idx)) = self.current.as_mut() {
            let last = self.pages.get(url.as_str()).map_or(0, |s| s.len().saturating_sub(1));
            *idx = (*idx + 1).min(last);
        }
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<bool, DriverError> {
        let found = self.matches(selector)? > 0;
        if found {
            self.clicks.push(selector.to_string());
        }
        Ok(found)
    }

    fn content(&mut self) -> Result<String, DriverError> {
        self.snapshot().map(str::to_string)
    }
}

impl Drop for FakeDriver {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}
