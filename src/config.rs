//! Configuration management for census-query.
//!
//! Handles loading configuration from TOML files:
//! the Nomisweb endpoint and credentials, and where artifacts are cached.

use crate::api::{load_lad_codes, NomiswebClient, NomiswebConfig, NOMISWEB_URL};
use crate::error::{CensusError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for census-query.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Nomisweb API configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Artifact cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Nomisweb API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// API key. `--api-key` or NOMIS_API_KEY take precedence.
    pub api_key: Option<String>,

    /// JSON file mapping local authority names to codes.
    pub lad_codes: Option<PathBuf>,
}

fn default_base_url() -> String {
    NOMISWEB_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
            lad_codes: None,
        }
    }
}

/// Artifact cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheConfig {
    /// Cache directory (defaults to the platform cache directory).
    pub dir: Option<PathBuf>,
}

impl ApiConfig {
    /// Builds a Nomisweb client caching into `cache_dir`.
    pub fn to_client(&self, cache_dir: PathBuf) -> Result<NomiswebClient> {
        let config = NomiswebConfig::new(cache_dir)
            .with_url(self.base_url.as_str())
            .with_api_key(self.api_key.clone())
            .with_timeout(self.timeout_secs);

        let client = NomiswebClient::new(config)?;
        match &self.lad_codes {
            Some(path) => Ok(client.with_lad_codes(load_lad_codes(path)?)),
            None => Ok(client),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("census-query")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CensusError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            CensusError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Resolves the cache directory: explicit override, then config file,
    /// then the platform cache directory.
    pub fn cache_dir(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.cache.dir.clone())
            .unwrap_or_else(|| {
                dirs::cache_dir()
                    .unwrap_or_else(std::env::temp_dir)
                    .join("census-query")
            })
    }
}
