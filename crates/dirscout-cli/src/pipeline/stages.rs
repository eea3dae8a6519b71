//! Stage bodies shared by the full pipeline and the single-stage commands.
//!
//! Every stage persists as it goes: list rows and detail rows are appended
//! to their stores, verification outcomes are appended per number.

use std::collections::HashSet;
use std::path::PathBuf;

use dirscout_core::{
    BusinessCandidate, BusinessRecord, ContactVerificationRecord, ListRow, PhoneNormalizer,
    SearchQuery, DEFAULT_SEARCH_TYPE,
};
use dirscout_scraper::{DetailScraper, ListScraper, PageDriver};
use dirscout_store::{append_row, read_all, DataLayout, FileKind, HistorySet};
use dirscout_verify::{
    CsvVerificationSink, VerificationOutcome, VerificationSink, VerificationStage, VerifyError,
};

/// Lists businesses for `query` and appends links not yet in the list store.
pub(crate) fn list_stage<D: PageDriver + ?Sized>(
    scraper: &ListScraper,
    driver: &mut D,
    layout: &DataLayout,
    query: &SearchQuery,
) -> anyhow::Result<Vec<BusinessCandidate>> {
    let candidates = scraper.list_businesses(driver, query)?;

    let path = layout.output_path(FileKind::List, &query.area, &query.search_type);
    let known: HashSet<String> = read_all::<ListRow>(&path)?
        .into_iter()
        .map(|row| row.link)
        .collect();

    let mut appended = 0usize;
    for candidate in candidates.iter().filter(|c| !known.contains(&c.link)) {
        append_row(&path, &ListRow::new(candidate, query))?;
        appended += 1;
    }

    tracing::info!(
        path = %path.display(),
        listed = candidates.len(),
        appended,
        "list store updated"
    );
    Ok(candidates)
}

/// Candidates read back from an existing list file.
pub(crate) struct StoredList {
    pub path: PathBuf,
    pub query: SearchQuery,
    pub candidates: Vec<BusinessCandidate>,
}

/// Resolves the list file for `area` and turns its rows into candidates.
///
/// Rows without a name or link are dropped, as are repeated links. The
/// query is rebuilt from the first row that carries search metadata.
pub(crate) fn load_list(
    layout: &DataLayout,
    area: &str,
    search_type: Option<&str>,
) -> anyhow::Result<StoredList> {
    let path = layout.resolve(FileKind::List, area, search_type)?;
    let rows: Vec<ListRow> = read_all(&path)?;

    let mut query = SearchQuery::for_area(area);
    if let Some(row) = rows.iter().find(|r| !r.search_type.is_empty()) {
        query.search_type.clone_from(&row.search_type);
        if !row.city.is_empty() {
            query.city.clone_from(&row.city);
        }
        if !row.country.is_empty() {
            query.country.clone_from(&row.country);
        }
    }
    if let Some(t) = search_type {
        query.search_type = t.to_string();
    }
    if query.search_type.is_empty() {
        query.search_type = DEFAULT_SEARCH_TYPE.to_string();
    }

    let mut seen = HashSet::new();
    let total = rows.len();
    let candidates: Vec<BusinessCandidate> = rows
        .iter()
        .filter_map(ListRow::to_candidate)
        .filter(|c| seen.insert(c.link.clone()))
        .collect();

    tracing::info!(
        path = %path.display(),
        rows = total,
        candidates = candidates.len(),
        "loaded list file"
    );
    Ok(StoredList {
        path,
        query,
        candidates,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DetailStageOutcome {
    pub enriched: usize,
    pub skipped: usize,
    pub already_enriched: usize,
}

/// Enriches every candidate whose link is not yet in the detail store,
/// appending each record as soon as it is extracted.
///
/// `progress` is updated as records are appended, so it holds the partial
/// counts when the stage fails.
pub(crate) fn detail_stage<D: PageDriver + ?Sized>(
    scraper: &DetailScraper,
    driver: &mut D,
    layout: &DataLayout,
    query: &SearchQuery,
    candidates: &[BusinessCandidate],
    progress: &mut DetailStageOutcome,
) -> anyhow::Result<()> {
    let path = layout.output_path(FileKind::Detail, &query.area, &query.search_type);
    let done: HashSet<String> = read_all::<BusinessRecord>(&path)?
        .into_iter()
        .map(|r| r.link)
        .filter(|link| !link.is_empty())
        .collect();

    let pending: Vec<BusinessCandidate> = candidates
        .iter()
        .filter(|c| !done.contains(&c.link))
        .cloned()
        .collect();
    progress.already_enriched = candidates.len() - pending.len();
    if progress.already_enriched > 0 {
        tracing::info!(
            already_enriched = progress.already_enriched,
            "resuming, skipping candidates already in the detail store"
        );
    }

    let enriched = &mut progress.enriched;
    let summary = scraper.enrich_all(driver, &pending, query, |record| -> anyhow::Result<()> {
        append_row(&path, record)?;
        *enriched += 1;
        Ok(())
    })?;
    progress.skipped = summary.skipped;
    Ok(())
}

/// Verified and not-verified rows persisted so far by [`verify_stage`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct VerificationTally {
    pub verified: usize,
    pub not_verified: usize,
}

/// Forwards outcomes to `inner` and counts the ones it accepted.
struct CountingSink<'a, S> {
    inner: S,
    tally: &'a mut VerificationTally,
}

impl<S: VerificationSink> VerificationSink for CountingSink<'_, S> {
    fn record(&mut self, outcome: &ContactVerificationRecord) -> Result<(), VerifyError> {
        self.inner.record(outcome)?;
        if outcome.verified {
            self.tally.verified += 1;
        } else {
            self.tally.not_verified += 1;
        }
        Ok(())
    }
}

/// Verifies `records` against the history rebuilt from both verification stores.
///
/// `tally` counts every persisted outcome, including those written before a
/// failure.
pub(crate) fn verify_stage<D: PageDriver + ?Sized>(
    stage: &VerificationStage,
    driver: &mut D,
    layout: &DataLayout,
    normalizer: &PhoneNormalizer,
    records: &[BusinessRecord],
    area: &str,
    tally: &mut VerificationTally,
) -> anyhow::Result<VerificationOutcome> {
    let mut history = HistorySet::load(&layout.verification_paths(), normalizer)?;
    tracing::info!(
        known = history.len(),
        records = records.len(),
        "starting verification"
    );
    let mut sink = CountingSink {
        inner: CsvVerificationSink::new(layout),
        tally,
    };
    Ok(stage.verify(driver, records, area, &mut history, &mut sink)?)
}

#[cfg(test)]
#[path = "stages_test.rs"]
mod tests;
