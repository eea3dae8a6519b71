//! End-to-end run: LISTING -> EXTRACTING -> VERIFYING -> DONE.
//!
//! The pipeline owns the page driver for the whole run and drops it before
//! returning, whichever way the run ends. Stage failures end the run in
//! ABORTED; output already appended to the stores stays valid.

pub(crate) mod stages;

use std::fmt;
use std::time::Duration;

use dirscout_core::{AppConfig, BusinessRecord, PhoneNormalizer, RunContext};
use dirscout_scraper::{
    DetailScraper, DetailScraperConfig, ListScraper, ListScraperConfig, PageDriver, ScrollPolicy,
};
use dirscout_store::{read_all, DataLayout, FileKind};
use dirscout_verify::{Preflight, PreflightStatus, ReachabilityChecker, VerificationStage};
use uuid::Uuid;

/// Settle time after the detail pane appears.
const DETAIL_SETTLE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PipelineState {
    Listing,
    Extracting,
    Verifying,
    Done,
    Aborted,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Listing => write!(f, "listing"),
            PipelineState::Extracting => write!(f, "extracting"),
            PipelineState::Verifying => write!(f, "verifying"),
            PipelineState::Done => write!(f, "done"),
            PipelineState::Aborted => write!(f, "aborted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum VerificationStatus {
    /// The run ended before verification was considered.
    NotReached,
    Disabled,
    Skipped { reason: String },
    /// Verification started but the run aborted before it finished.
    Incomplete,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Halt {
    NoCandidates,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PipelineReport {
    pub run_id: Uuid,
    pub state: PipelineState,
    pub listed: usize,
    pub enriched: usize,
    pub detail_skipped: usize,
    pub already_enriched: usize,
    pub verification: VerificationStatus,
    pub verified: usize,
    pub not_verified: usize,
    pub halt: Option<Halt>,
}

impl PipelineReport {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            state: PipelineState::Listing,
            listed: 0,
            enriched: 0,
            detail_skipped: 0,
            already_enriched: 0,
            verification: VerificationStatus::NotReached,
            verified: 0,
            not_verified: 0,
            halt: None,
        }
    }

    /// 0 for completed runs (verification skipped included), 2 when the list
    /// stage found nothing, 1 when the run aborted.
    pub(crate) fn exit_code(&self) -> u8 {
        match (&self.state, &self.halt) {
            (PipelineState::Aborted, _) | (_, Some(Halt::Failed(_))) => 1,
            (_, Some(Halt::NoCandidates)) => 2,
            _ => 0,
        }
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run {} finished: {}", self.run_id, self.state)?;
        writeln!(f, "  listed:        {}", self.listed)?;
        write!(f, "  enriched:      {}", self.enriched)?;
        if self.detail_skipped > 0 || self.already_enriched > 0 {
            write!(
                f,
                " ({} skipped, {} already enriched)",
                self.detail_skipped, self.already_enriched
            )?;
        }
        writeln!(f)?;
        match &self.verification {
            VerificationStatus::Completed => writeln!(
                f,
                "  verification:  {} verified, {} not verified",
                self.verified, self.not_verified
            )?,
            VerificationStatus::Skipped { reason } => writeln!(
                f,
                "  verification:  0 verified, 0 not verified (skipped: {reason})"
            )?,
            VerificationStatus::Incomplete => writeln!(
                f,
                "  verification:  {} verified, {} not verified (incomplete)",
                self.verified, self.not_verified
            )?,
            VerificationStatus::Disabled => writeln!(f, "  verification:  disabled")?,
            VerificationStatus::NotReached => writeln!(f, "  verification:  not reached")?,
        }
        match &self.halt {
            Some(Halt::NoCandidates) => writeln!(f, "  halted: no businesses found")?,
            Some(Halt::Failed(reason)) => writeln!(f, "  halted: {reason}")?,
            None => {}
        }
        Ok(())
    }
}

pub(crate) fn list_scraper(config: &AppConfig) -> anyhow::Result<ListScraper> {
    Ok(ListScraper::new(ListScraperConfig {
        search_base_url: config.search_base_url.clone(),
        feed_timeout: config.feed_timeout(),
        scroll: ScrollPolicy {
            pause: config.scroll_pause(),
            max_iterations: config.scroll_max_iterations,
        },
    })?)
}

pub(crate) fn detail_scraper(config: &AppConfig) -> anyhow::Result<DetailScraper> {
    Ok(DetailScraper::new(DetailScraperConfig {
        pane_timeout: config.detail_timeout(),
        settle: DETAIL_SETTLE,
        request_delay: config.request_delay(),
    })?)
}

pub(crate) fn verification_stage(config: &AppConfig) -> VerificationStage {
    VerificationStage::new(
        PhoneNormalizer::new(&config.country_code),
        ReachabilityChecker::new(&config.verify_url_template, config.verify_timeout()),
    )
}

pub(crate) struct Pipeline<P> {
    list: ListScraper,
    detail: DetailScraper,
    verification: VerificationStage,
    normalizer: PhoneNormalizer,
    layout: DataLayout,
    preflight: P,
    verify_enabled: bool,
}

impl<P: Preflight> Pipeline<P> {
    pub(crate) fn from_config(
        config: &AppConfig,
        preflight: P,
        verify_enabled: bool,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            list: list_scraper(config)?,
            detail: detail_scraper(config)?,
            verification: verification_stage(config),
            normalizer: PhoneNormalizer::new(&config.country_code),
            layout: DataLayout::new(&config.data_dir),
            preflight,
            verify_enabled,
        })
    }

    /// Runs every stage with `driver`, which is dropped before this returns.
    pub(crate) fn run<D: PageDriver>(&self, driver: D, ctx: &RunContext) -> PipelineReport {
        let mut driver = driver;
        let mut report = PipelineReport::new(ctx.run_id);

        let result = self.advance(&mut driver, ctx, &mut report);
        drop(driver);
        tracing::debug!(run_id = %ctx.run_id, "page driver released");

        if let Err(e) = result {
            tracing::error!(
                run_id = %ctx.run_id,
                stage = %report.state,
                error = %format!("{e:#}"),
                "pipeline aborted"
            );
            report.state = PipelineState::Aborted;
            report.halt = Some(Halt::Failed(format!("{e:#}")));
        } else {
            tracing::info!(
                run_id = %ctx.run_id,
                elapsed_secs = ctx.elapsed_secs(),
                listed = report.listed,
                enriched = report.enriched,
                verified = report.verified,
                not_verified = report.not_verified,
                "pipeline finished"
            );
        }
        report
    }

    fn advance<D: PageDriver>(
        &self,
        driver: &mut D,
        ctx: &RunContext,
        report: &mut PipelineReport,
    ) -> anyhow::Result<()> {
        let query = &ctx.query;

        report.state = PipelineState::Listing;
        let candidates = {
            let _span = ctx.stage_span("listing").entered();
            stages::list_stage(&self.list, driver, &self.layout, query)?
        };
        report.listed = candidates.len();
        if candidates.is_empty() {
            tracing::warn!(query = %query.text(), "no businesses found, halting");
            report.halt = Some(Halt::NoCandidates);
            report.state = PipelineState::Done;
            return Ok(());
        }

        report.state = PipelineState::Extracting;
        let mut details = stages::DetailStageOutcome::default();
        let extracted = {
            let _span = ctx.stage_span("extracting").entered();
            stages::detail_stage(
                &self.detail,
                driver,
                &self.layout,
                query,
                &candidates,
                &mut details,
            )
        };
        report.enriched = details.enriched;
        report.detail_skipped = details.skipped;
        report.already_enriched = details.already_enriched;
        extracted?;

        if !self.verify_enabled {
            report.verification = VerificationStatus::Disabled;
            report.state = PipelineState::Done;
            return Ok(());
        }

        if let PreflightStatus::Unreachable { reason } = self.preflight.check() {
            tracing::warn!(%reason, "verification endpoint unreachable, skipping verification");
            report.verification = VerificationStatus::Skipped { reason };
            report.state = PipelineState::Done;
            return Ok(());
        }

        report.state = PipelineState::Verifying;
        report.verification = VerificationStatus::Incomplete;
        let mut tally = stages::VerificationTally::default();
        let checked = {
            let _span = ctx.stage_span("verifying").entered();
            let detail_path =
                self.layout
                    .output_path(FileKind::Detail, &query.area, &query.search_type);
            read_all::<BusinessRecord>(&detail_path)
                .map_err(anyhow::Error::from)
                .and_then(|records| {
                    stages::verify_stage(
                        &self.verification,
                        driver,
                        &self.layout,
                        &self.normalizer,
                        &records,
                        &query.area,
                        &mut tally,
                    )
                })
        };
        report.verified = tally.verified;
        report.not_verified = tally.not_verified;
        checked?;
        report.verification = VerificationStatus::Completed;
        report.state = PipelineState::Done;
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
