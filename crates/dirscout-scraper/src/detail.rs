//! Detail-page enrichment of listed candidates.

use std::time::Duration;

use dirscout_core::{BusinessCandidate, BusinessRecord, SearchQuery};
use scraper::{Html, Selector};

use crate::driver::{skip_page_failure, PageDriver};
use crate::error::ScraperError;
use crate::extract::{compile_selector, detail_fields, Field, FieldExtractor};
use crate::pacing::RequestPacer;

pub const DETAIL_PANE_SELECTOR: &str = r#"div[role="main"]"#;

#[derive(Debug, Clone)]
pub struct DetailScraperConfig {
    /// How long to wait for the detail pane before skipping a candidate.
    pub pane_timeout: Duration,
    /// Extra settle time once the pane is present, for lazily rendered fields.
    pub settle: Duration,
    /// Delay applied after every candidate.
    pub request_delay: Duration,
}

/// Counts from one [`DetailScraper::enrich_all`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    pub enriched: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub struct DetailScraper {
    config: DetailScraperConfig,
    fields: FieldExtractor,
    pane: Selector,
    pacer: RequestPacer,
}

impl DetailScraper {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if a built-in selector fails to compile.
    pub fn new(config: DetailScraperConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            fields: FieldExtractor::new(detail_fields())?,
            pane: compile_selector(DETAIL_PANE_SELECTOR)?,
            pacer: RequestPacer::new(config.request_delay),
            config,
        })
    }

    /// Visits the candidate's detail page and extracts a record.
    ///
    /// Returns `Ok(None)` when the page fails to load or the detail pane does
    /// not appear within the timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Driver`] only for session-level failures.
    pub fn enrich<D: PageDriver + ?Sized>(
        &self,
        driver: &mut D,
        candidate: &BusinessCandidate,
        query: &SearchQuery,
    ) -> Result<Option<BusinessRecord>, ScraperError> {
        if skip_page_failure(driver.navigate(&candidate.link), "detail page")?.is_none() {
            return Ok(None);
        }
        if skip_page_failure(
            driver.wait_for(DETAIL_PANE_SELECTOR, self.config.pane_timeout),
            "detail pane",
        )?
        .is_none()
        {
            tracing::warn!(name = %candidate.name, "detail pane did not load, skipping");
            return Ok(None);
        }

        if !self.config.settle.is_zero() {
            std::thread::sleep(self.config.settle);
        }

        let Some(html) = skip_page_failure(driver.content(), "detail snapshot")? else {
            return Ok(None);
        };
        Ok(Some(self.parse_record(&html, candidate, query)))
    }

    /// Builds a record from a rendered detail page.
    ///
    /// Extraction is scoped to the detail pane when present. The listed name
    /// is kept when the page has none.
    #[must_use]
    pub fn parse_record(
        &self,
        html: &str,
        candidate: &BusinessCandidate,
        query: &SearchQuery,
    ) -> BusinessRecord {
        let doc = Html::parse_document(html);
        let scope = doc
            .select(&self.pane)
            .next()
            .unwrap_or_else(|| doc.root_element());
        let mut fields = self.fields.extract(scope);

        let name = match fields.take(Field::Name) {
            n if n.is_empty() => candidate.name.clone(),
            n => n,
        };

        BusinessRecord {
            name,
            address: fields.take(Field::Address),
            phone: fields.take(Field::Phone),
            email: fields.take(Field::Email),
            website: fields.take(Field::Website),
            image_url: fields.take(Field::Image),
            link: candidate.link.clone(),
            area: query.area.clone(),
            search_type: query.search_type.clone(),
        }
    }

    /// Enriches `candidates` in order, handing each record to `on_record` as
    /// soon as it is extracted, and pacing after every candidate.
    ///
    /// # Errors
    ///
    /// Stops at the first session-level driver failure or `on_record` error.
    pub fn enrich_all<D, F, E>(
        &self,
        driver: &mut D,
        candidates: &[BusinessCandidate],
        query: &SearchQuery,
        mut on_record: F,
    ) -> Result<EnrichSummary, E>
    where
        D: PageDriver + ?Sized,
        F: FnMut(&BusinessRecord) -> Result<(), E>,
        E: From<ScraperError>,
    {
        let mut summary = EnrichSummary::default();
        let total = candidates.len();

        for (idx, candidate) in candidates.iter().enumerate() {
            tracing::info!(
                index = idx + 1,
                total,
                name = %candidate.name,
                "enriching candidate"
            );
            match self.enrich(driver, candidate, query)? {
                Some(record) => {
                    on_record(&record)?;
                    summary.enriched += 1;
                }
                None => summary.skipped += 1,
            }
            self.pacer.pace();
        }

        tracing::info!(
            enriched = summary.enriched,
            skipped = summary.skipped,
            "detail extraction finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "detail_test.rs"]
mod tests;
