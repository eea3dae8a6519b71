mod commands;
mod pipeline;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use dirscout_core::{SearchQuery, DEFAULT_CITY, DEFAULT_COUNTRY, DEFAULT_SEARCH_TYPE};
use dirscout_store::StoreError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dirscout")]
#[command(about = "Collect business directory listings and verify their contact numbers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List, enrich and verify businesses for one area
    Run {
        #[command(flatten)]
        query: QueryArgs,
        /// Stop after detail extraction
        #[arg(long)]
        skip_verification: bool,
    },
    /// Only collect the search-results list for an area
    List {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Enrich a previously collected list with detail-page data
    Details {
        area: String,
        /// Business type of the list file; every known type is tried when omitted
        #[arg(long)]
        search_type: Option<String>,
    },
    /// Verify the phone numbers of previously enriched records
    Verify {
        area: String,
        /// Business type of the detail file; every known type is tried when omitted
        #[arg(long)]
        search_type: Option<String>,
    },
    /// Check connectivity to the verification endpoint and reference hosts
    Diagnose,
}

#[derive(Debug, Args)]
struct QueryArgs {
    /// Area to search in, e.g. "Victoria Island"
    area: String,
    #[arg(long, default_value = DEFAULT_SEARCH_TYPE)]
    search_type: String,
    #[arg(long, default_value = DEFAULT_CITY)]
    city: String,
    #[arg(long, default_value = DEFAULT_COUNTRY)]
    country: String,
}

impl From<QueryArgs> for SearchQuery {
    fn from(args: QueryArgs) -> Self {
        SearchQuery {
            search_type: args.search_type,
            area: args.area,
            city: args.city,
            country: args.country,
        }
    }
}

/// Exit status for a failed command: 2 when a required input file is
/// missing, 1 otherwise.
fn failure_exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::InputMissing { .. }) => 2,
        _ => 1,
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = dirscout_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Run {
            query,
            skip_verification,
        } => commands::run_pipeline(config, query.into(), !skip_verification).await,
        Commands::List { query } => commands::run_list(config, query.into()).await,
        Commands::Details { area, search_type } => {
            commands::run_details(config, area, search_type).await
        }
        Commands::Verify { area, search_type } => {
            commands::run_verify(config, area, search_type).await
        }
        Commands::Diagnose => commands::run_diagnose(&config).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(failure_exit_code(&e))
        }
    }
}
