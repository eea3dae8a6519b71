//! Per-number reachability check against a click-to-chat landing page.
//!
//! The landing page only reports failure explicitly, so a number counts as
//! reachable when none of the known failure phrases appear.

use std::time::Duration;

use dirscout_scraper::{DriverError, PageDriver};

/// Phrases the endpoint shows for numbers that cannot be reached.
pub const FAILURE_PHRASES: [&str; 4] = [
    "Phone number shared via url is invalid",
    "Invalid phone number",
    "Phone number shared via url is not on WhatsApp",
    "This phone number is not registered on WhatsApp",
];

#[derive(Debug, Clone)]
pub struct ReachabilityChecker {
    url_template: String,
    timeout: Duration,
}

impl ReachabilityChecker {
    /// `url_template` must contain a `{phone}` placeholder.
    #[must_use]
    pub fn new(url_template: &str, timeout: Duration) -> Self {
        Self {
            url_template: url_template.to_string(),
            timeout,
        }
    }

    #[must_use]
    pub fn url_for(&self, phone: &str) -> String {
        self.url_template.replace("{phone}", phone)
    }

    /// Returns `true` unless `page_source` contains a failure phrase.
    #[must_use]
    pub fn classify(page_source: &str) -> bool {
        !FAILURE_PHRASES
            .iter()
            .any(|phrase| page_source.contains(phrase))
    }

    /// Loads the landing page for a canonical `phone` and classifies it.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] if the page cannot be loaded or read.
    pub fn check<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        phone: &str,
    ) -> Result<bool, DriverError> {
        let url = self.url_for(phone);
        driver.navigate(&url)?;
        driver.wait_for("body", self.timeout)?;
        let source = driver.content()?;
        Ok(Self::classify(&source))
    }
}
