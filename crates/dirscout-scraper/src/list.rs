//! Search-results listing: one query in, deduplicated candidates out.

use std::collections::HashSet;
use std::time::Duration;

use dirscout_core::{BusinessCandidate, SearchQuery};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use scraper::{Html, Selector};

use crate::driver::{skip_page_failure, PageDriver};
use crate::error::ScraperError;
use crate::extract::{compile_selector, list_item_fields, Field, FieldExtractor};
use crate::pagination::{scroll_to_exhaustion, ScrollPolicy};

pub const FEED_SELECTOR: &str = r#"[role="feed"]"#;
pub const ITEM_SELECTOR: &str = r#"[role="feed"] [role="article"]"#;
const LEGACY_ITEM_SELECTOR: &str = "div.Nv2PK";
/// Union of the item selectors, used to measure feed growth while scrolling.
const FEED_ITEMS_SELECTOR: &str = r#"[role="feed"] [role="article"], div.Nv2PK"#;

/// Cookie-consent buttons dismissed before the feed is read.
const CONSENT_SELECTORS: [&str; 3] = [
    r#"button[aria-label*="Accept all"]"#,
    r#"button[aria-label*="Accept"]"#,
    r#"button[id*="accept"]"#,
];

#[derive(Debug, Clone)]
pub struct ListScraperConfig {
    pub search_base_url: String,
    pub feed_timeout: Duration,
    pub scroll: ScrollPolicy,
}

#[derive(Debug)]
pub struct ListScraper {
    config: ListScraperConfig,
    fields: FieldExtractor,
    item_selectors: Vec<Selector>,
}

impl ListScraper {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if a built-in selector fails to compile.
    pub fn new(config: ListScraperConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            config,
            fields: FieldExtractor::new(list_item_fields())?,
            item_selectors: vec![
                compile_selector(ITEM_SELECTOR)?,
                compile_selector(LEGACY_ITEM_SELECTOR)?,
            ],
        })
    }

    /// Search URL for `query`.
    #[must_use]
    pub fn search_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}{}",
            self.config.search_base_url,
            utf8_percent_encode(&query.text(), NON_ALPHANUMERIC)
        )
    }

    /// Loads the search results for `query`, scrolls the feed until it is
    /// exhausted and returns every candidate with both a name and a link.
    ///
    /// A page that fails to load, or never shows a results feed, yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Driver`] only for session-level failures.
    pub fn list_businesses<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        query: &SearchQuery,
    ) -> Result<Vec<BusinessCandidate>, ScraperError> {
        let url = self.search_url(query);
        tracing::info!(query = %query.text(), %url, "loading search results");

        if skip_page_failure(driver.navigate(&url), "search page")?.is_none() {
            return Ok(Vec::new());
        }

        self.dismiss_consent(driver)?;

        if skip_page_failure(
            driver.wait_for(FEED_SELECTOR, self.config.feed_timeout),
            "results feed",
        )?
        .is_none()
        {
            return Ok(Vec::new());
        }

        if let Some(outcome) = skip_page_failure(
            scroll_to_exhaustion(driver, FEED_SELECTOR, FEED_ITEMS_SELECTOR, &self.config.scroll),
            "feed scrolling",
        )? {
            tracing::info!(
                loaded = outcome.final_count,
                scrolls = outcome.iterations,
                converged = outcome.converged,
                "results feed loaded"
            );
        }

        let Some(html) = skip_page_failure(driver.content(), "results snapshot")? else {
            return Ok(Vec::new());
        };
        Ok(self.parse_candidates(&html))
    }

    /// Best effort: clicks the first consent button present, ignoring
    /// page-level failures.
    fn dismiss_consent<D: PageDriver + ?Sized>(&self, driver: &mut D) -> Result<(), ScraperError> {
        for selector in CONSENT_SELECTORS {
            if let Some(true) = skip_page_failure(driver.click(selector), "consent dialog")? {
                tracing::debug!(selector, "dismissed consent dialog");
                break;
            }
        }
        Ok(())
    }

    /// Extracts candidates from a rendered results page.
    ///
    /// Entries without a name or link are dropped, as are repeated links.
    #[must_use]
    pub fn parse_candidates(&self, html: &str) -> Vec<BusinessCandidate> {
        let doc = Html::parse_document(html);

        let items: Vec<_> = self
            .item_selectors
            .iter()
            .map(|selector| doc.select(selector).collect::<Vec<_>>())
            .find(|items| !items.is_empty())
            .unwrap_or_default();

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut dropped = 0usize;

        for item in items {
            let mut fields = self.fields.extract(item);
            let name = fields.take(Field::Name);
            let link = fields.take(Field::Link);

            if name.is_empty() || link.is_empty() {
                dropped += 1;
                tracing::debug!(%name, %link, "dropping feed entry without name or link");
                continue;
            }
            if !seen.insert(link.clone()) {
                tracing::debug!(%link, "dropping duplicate feed entry");
                continue;
            }
            candidates.push(BusinessCandidate { name, link });
        }

        tracing::info!(
            candidates = candidates.len(),
            dropped,
            "parsed results feed"
        );
        candidates
    }
}

#[cfg(test)]
#[path = "list_test.rs"]
mod tests;
