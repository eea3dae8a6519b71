//! The page-driver seam between the scrapers and a live browser.
//!
//! Every stage borrows one driver mutably and uses it serially. Failures
//! are split into page-level ones (the current page is skipped) and
//! session-level ones (the run cannot continue).

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out after {timeout_ms}ms waiting for \"{selector}\"")]
    Timeout { selector: String, timeout_ms: u128 },

    #[error("page script failed: {0}")]
    Script(String),

    #[error("browser session failed: {0}")]
    Session(String),
}

impl DriverError {
    /// Returns `true` if only the current page is affected and the caller
    /// may move on to the next one.
    #[must_use]
    pub fn is_page_level(&self) -> bool {
        !matches!(self, DriverError::Session(_))
    }
}

/// Minimal browser capability used by the scrapers.
///
/// Implementations release their browser resources on `Drop`.
pub trait PageDriver {
    /// Loads `url` and waits for the navigation to settle.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Navigation`] if the page cannot be loaded.
    fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    /// Polls until an element matching `selector` is present or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Timeout`] if no element appears in time.
    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Number of elements currently matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Script`] if the page cannot be queried.
    fn count(&mut self, selector: &str) -> Result<usize, DriverError>;

    /// Scrolls the first element matching `container` to its bottom edge.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Script`] if the scroll cannot be performed.
    fn scroll_to_bottom(&mut self, container: &str) -> Result<(), DriverError>;

    /// Clicks the first element matching `selector`. Returns `false` when
    /// nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Script`] if a matching element cannot be clicked.
    fn click(&mut self, selector: &str) -> Result<bool, DriverError>;

    /// Rendered HTML of the current page.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] if the page source cannot be read.
    fn content(&mut self) -> Result<String, DriverError>;
}

impl<D: PageDriver + ?Sized> PageDriver for Box<D> {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        (**self).navigate(url)
    }

    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), DriverError> {
        (**self).wait_for(selector, timeout)
    }

    fn count(&mut self, selector: &str) -> Result<usize, DriverError> {
        (**self).count(selector)
    }

    fn scroll_to_bottom(&mut self, container: &str) -> Result<(), DriverError> {
        (**self).scroll_to_bottom(container)
    }

    fn click(&mut self, selector: &str) -> Result<bool, DriverError> {
        (**self).click(selector)
    }

    fn content(&mut self) -> Result<String, DriverError> {
        (**self).content()
    }
}

/// Turns a page-level failure into `Ok(None)` after logging it; session
/// failures are passed through.
///
/// # Errors
///
/// Returns the original error if it is not page-level.
pub fn skip_page_failure<T>(
    result: Result<T, DriverError>,
    context: &str,
) -> Result<Option<T>, DriverError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_page_level() => {
            tracing::warn!(context, error = %e, "page-level failure, skipping");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
