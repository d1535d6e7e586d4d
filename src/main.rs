//! ukcensus-query - Interactive query builder for Nomisweb census tables.

mod cli;
mod logging;

use census_query::api::{CensusApi, MockCensusApi};
use census_query::config::Config;
use census_query::console::{Console, ScriptedConsole, TerminalConsole};
use census_query::error::{CensusError, Result};
use census_query::query::{QueryBuilder, SessionOutcome};
use cli::Cli;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse_args();

    logging::init(logging::LogTarget::for_session(cli.is_headless()));

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        eprintln!("{e}");
        std::process::exit(if e.is_fatal() { 2 } else { 1 });
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    if cli.api_key.is_some() {
        config.api.api_key = cli.api_key.clone();
    }

    let cache_dir = config.cache_dir(cli.cache_dir.as_deref());
    std::fs::create_dir_all(&cache_dir).map_err(|e| {
        CensusError::io(format!(
            "Failed to create cache directory {}: {e}",
            cache_dir.display()
        ))
    })?;
    info!("Cache directory: {}", cache_dir.display());

    let api = connect(&cli, &config, cache_dir)?;

    let outcome = match cli.read_script()? {
        Some(script) => {
            let mut console = ScriptedConsole::from_script(&script).with_echo(true);
            let outcome = run_session(api.as_ref(), &mut console).await?;
            if console.remaining() > 0 {
                warn!("{} unused script answers", console.remaining());
            }
            outcome
        }
        None => run_session(api.as_ref(), &mut TerminalConsole::new()).await?,
    };

    info!(
        "Wrote {}, {} and {}",
        outcome.metadata_path.display(),
        outcome.artifacts.python_path.display(),
        outcome.artifacts.r_path.display()
    );
    if let Some(path) = &outcome.data_path {
        info!("Data cached at {}", path.display());
    }
    Ok(())
}

/// Creates the accessor: the mock when requested, otherwise Nomisweb.
fn connect(cli: &Cli, config: &Config, cache_dir: PathBuf) -> Result<Box<dyn CensusApi>> {
    if cli.mock_api {
        info!("Using mock census API");
        return Ok(Box::new(MockCensusApi::with_ks401ew(cache_dir)));
    }

    if config.api.api_key.is_none() {
        warn!("No Nomisweb API key configured; set NOMIS_API_KEY to fetch data");
    }
    Ok(Box::new(config.api.to_client(cache_dir)?))
}

async fn run_session<C: Console>(api: &dyn CensusApi, console: &mut C) -> Result<SessionOutcome> {
    QueryBuilder::new(api).run(console).await
}
