//! Command-line argument parsing for ukcensus-query.
//!
//! Uses clap to parse CLI arguments.

use census_query::config::Config;
use census_query::error::{CensusError, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;

/// Interactive query builder for Nomisweb census tables.
///
/// Walks a table's fields, resolves a geography, and writes the metadata
/// plus Python and R snippets reproducing the query to the cache directory.
#[derive(Parser, Debug)]
#[command(name = "ukcensus-query")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory for cached metadata, data and generated code
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Answer prompts from a file, one answer per line (use "-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub script: Option<String>,

    /// Use the in-memory mock API (for testing)
    #[arg(long)]
    pub mock_api: bool,

    /// Nomisweb API key
    #[arg(long, value_name = "KEY", env = "NOMIS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Returns true if prompts are answered from a script.
    pub fn is_headless(&self) -> bool {
        self.script.is_some()
    }

    /// Reads the answer script, from stdin when the path is "-".
    pub fn read_script(&self) -> Result<Option<String>> {
        let Some(source) = self.script.as_deref() else {
            return Ok(None);
        };

        let script = if source == "-" {
            let mut script = String::new();
            std::io::stdin()
                .read_to_string(&mut script)
                .map_err(|e| CensusError::input(format!("Failed to read script from stdin: {e}")))?;
            script
        } else {
            std::fs::read_to_string(source)
                .map_err(|e| CensusError::config(format!("Failed to read script {source}: {e}")))?
        };
        Ok(Some(script))
    }
}
