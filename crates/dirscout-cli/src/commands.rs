//! Subcommand handlers.
//!
//! The browser session is blocking, so every handler that drives a page
//! runs its whole session inside `spawn_blocking` and only prints from the
//! async side.

use std::process::ExitCode;

use anyhow::Context;
use dirscout_core::{AppConfig, BusinessRecord, PhoneNormalizer, RunContext, SearchQuery};
use dirscout_scraper::ChromeDriver;
use dirscout_store::{read_all, DataLayout, FileKind};
use dirscout_verify::{NetworkDiagnostics, Preflight, PreflightStatus};

use crate::pipeline::{self, stages, Pipeline};

/// Runs `session` on the blocking pool with `config` moved in.
async fn blocking<T, F>(config: AppConfig, session: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce(AppConfig) -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || session(config))
        .await
        .context("browser session task panicked")?
}

pub(crate) async fn run_pipeline(
    config: AppConfig,
    query: SearchQuery,
    verify_enabled: bool,
) -> anyhow::Result<ExitCode> {
    let ctx = RunContext::new(query);
    tracing::info!(run_id = %ctx.run_id, query = %ctx.query.text(), "starting pipeline run");
    let runtime = tokio::runtime::Handle::current();

    let report = blocking(config, move |config| {
        let preflight = NetworkDiagnostics::new(config.probe.clone(), runtime);
        let pipeline = Pipeline::from_config(&config, preflight, verify_enabled)?;
        let driver = ChromeDriver::launch(&config.browser)?;
        Ok(pipeline.run(driver, &ctx))
    })
    .await?;

    println!("{report}");
    Ok(ExitCode::from(report.exit_code()))
}

pub(crate) async fn run_list(config: AppConfig, query: SearchQuery) -> anyhow::Result<ExitCode> {
    let ctx = RunContext::new(query);

    let candidates = blocking(config, move |config| {
        let scraper = pipeline::list_scraper(&config)?;
        let layout = DataLayout::new(&config.data_dir);
        let mut driver = ChromeDriver::launch(&config.browser)?;
        let _span = ctx.stage_span("listing").entered();
        stages::list_stage(&scraper, &mut driver, &layout, &ctx.query)
    })
    .await?;

    println!("listed {} businesses", candidates.len());
    if candidates.is_empty() {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) async fn run_details(
    config: AppConfig,
    area: String,
    search_type: Option<String>,
) -> anyhow::Result<ExitCode> {
    let layout = DataLayout::new(&config.data_dir);
    let stored = stages::load_list(&layout, &area, search_type.as_deref())?;
    if stored.candidates.is_empty() {
        println!("{} has no usable rows", stored.path.display());
        return Ok(ExitCode::from(2));
    }

    let ctx = RunContext::new(stored.query.clone());
    let outcome = blocking(config, move |config| {
        let scraper = pipeline::detail_scraper(&config)?;
        let mut driver = ChromeDriver::launch(&config.browser)?;
        let _span = ctx.stage_span("extracting").entered();
        let mut outcome = stages::DetailStageOutcome::default();
        stages::detail_stage(
            &scraper,
            &mut driver,
            &layout,
            &ctx.query,
            &stored.candidates,
            &mut outcome,
        )
        .with_context(|| format!("detail extraction stopped after {} records", outcome.enriched))?;
        Ok(outcome)
    })
    .await?;

    println!(
        "enriched {} businesses ({} skipped, {} already enriched)",
        outcome.enriched, outcome.skipped, outcome.already_enriched
    );
    Ok(ExitCode::SUCCESS)
}

pub(crate) async fn run_verify(
    config: AppConfig,
    area: String,
    search_type: Option<String>,
) -> anyhow::Result<ExitCode> {
    let layout = DataLayout::new(&config.data_dir);
    let path = layout.resolve(FileKind::Detail, &area, search_type.as_deref())?;
    let records: Vec<BusinessRecord> = read_all(&path)?;
    tracing::info!(path = %path.display(), records = records.len(), "loaded detail file");

    let mut query = SearchQuery::for_area(&area);
    if let Some(t) = search_type {
        query.search_type = t;
    }
    let ctx = RunContext::new(query);
    let runtime = tokio::runtime::Handle::current();

    let outcome = blocking(config, move |config| {
        let preflight = NetworkDiagnostics::new(config.probe.clone(), runtime);
        if let PreflightStatus::Unreachable { reason } = preflight.check() {
            return Ok(Err(reason));
        }
        let stage = pipeline::verification_stage(&config);
        let normalizer = PhoneNormalizer::new(&config.country_code);
        let mut driver = ChromeDriver::launch(&config.browser)?;
        let _span = ctx.stage_span("verifying").entered();
        stages::verify_stage(
            &stage,
            &mut driver,
            &layout,
            &normalizer,
            &records,
            &ctx.query.area,
            &mut stages::VerificationTally::default(),
        )
        .map(Ok)
    })
    .await?;

    match outcome {
        Ok(outcome) => println!(
            "verified {}, not verified {} ({} already known, {} without phone, {} check failures)",
            outcome.verified.len(),
            outcome.not_verified.len(),
            outcome.skipped_known,
            outcome.skipped_no_phone,
            outcome.check_failures
        ),
        Err(reason) => {
            println!("verification skipped: {reason}");
            println!("run `dirscout diagnose` for details");
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) async fn run_diagnose(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let http_url = config
        .verify_url_template
        .split("{phone}")
        .next()
        .unwrap_or_default()
        .to_string();

    let report = dirscout_verify::diagnose(&config.probe, &http_url).await;
    print!("{report}");

    if report.probe_reachable() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}
