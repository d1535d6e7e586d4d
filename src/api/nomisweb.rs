//! Nomisweb API client implementation.
//!
//! Implements the CensusApi trait against the Nomisweb SDMX/JSON endpoints.
//! Table metadata and area codes are read from `*.def.sdmx.json` documents;
//! query data is fetched as TSV and cached under the cache directory.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::{
    build_url, data_path, write_cache_file, AreaCodeList, Categories, CensusApi, QueryParameters,
    TableMetadata, CREDENTIAL_KEY, NOMISWEB_URL,
};
use crate::error::{CensusError, Result};
use crate::geography::Resolution;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Dataset whose geography dimension is used to enumerate area codes.
const GEOGRAPHY_DATASET: &str = "NM_144_1";

/// Dimension whose codelist is too large to enumerate.
const GEOGRAPHY_FIELD: &str = "GEOGRAPHY";

/// Nomisweb client configuration.
#[derive(Debug, Clone)]
pub struct NomiswebConfig {
    /// Base URL for the API, always ending in `/`.
    pub base_url: String,
    /// Directory for cached metadata, data and generated code.
    pub cache_dir: PathBuf,
    /// API key sent as `uid` with data requests.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl NomiswebConfig {
    /// Creates a new config caching into `cache_dir`.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: NOMISWEB_URL.to_string(),
            cache_dir: cache_dir.into(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.base_url = url;
        self
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Nomisweb census API client.
#[derive(Debug, Clone)]
pub struct NomiswebClient {
    config: NomiswebConfig,
    client: Client,
    lad_codes: HashMap<String, String>,
}

impl NomiswebClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: NomiswebConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CensusError::api(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            lad_codes: HashMap::new(),
        })
    }

    /// Sets the local authority name to code lookup.
    pub fn with_lad_codes(mut self, lad_codes: HashMap<String, String>) -> Self {
        self.lad_codes = lad_codes;
        self
    }

    /// Returns the definition URL for a table, searching by name unless an
    /// internal `NM_` id is given.
    fn table_def_url(&self, table: &str) -> Result<Url> {
        let base = &self.config.base_url;
        if table.starts_with("NM_") {
            return parse_url(&format!("{base}api/v01/dataset/{table}.def.sdmx.json"));
        }

        let mut url = parse_url(&format!("{base}api/v01/dataset/def.sdmx.json"))?;
        url.query_pairs_mut().append_pair("search", &format!("*{table}*"));
        Ok(url)
    }

    /// Returns the codelist URL for one field of a table.
    fn field_def_url(&self, nomis_table: &str, field: &str) -> Result<Url> {
        parse_url(&format!(
            "{}api/v01/dataset/{nomis_table}/{field}.def.sdmx.json",
            self.config.base_url
        ))
    }

    /// Returns the URL listing all areas of `resolution` within `coverage`.
    fn geography_def_url(&self, coverage: &str, resolution: Resolution) -> Result<Url> {
        parse_url(&format!(
            "{}api/v01/dataset/{GEOGRAPHY_DATASET}/geography/{coverage}{}.def.sdmx.json",
            self.config.base_url,
            resolution.nomis_type()
        ))
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                CensusError::api("Request timed out. Try again.")
            } else if e.is_connect() {
                CensusError::api(format!("Failed to connect to {}", self.config.base_url))
            } else {
                CensusError::api(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CensusError::api(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(CensusError::api(format!(
                "Nomisweb API error ({status}): {body}"
            )));
        }

        Ok(body)
    }

    async fn fetch_structure(&self, url: &Url) -> Result<SdmxStructure> {
        let body = self.fetch_text(url.as_str()).await?;
        parse_structure(&body)
    }
}

#[async_trait]
impl CensusApi for NomiswebClient {
    async fn get_metadata(&self, table: &str) -> Result<TableMetadata> {
        let structure = self.fetch_structure(&self.table_def_url(table)?).await?;
        let family = select_key_family(structure, table)?;

        let mut metadata = TableMetadata::new(family.name.value, family.id);
        for dimension in family.components.dimension {
            let field = dimension.conceptref;
            let categories = if field == GEOGRAPHY_FIELD {
                Categories::new()
            } else {
                let url = self.field_def_url(&metadata.nomis_table, &field)?;
                parse_categories(self.fetch_structure(&url).await?)
            };
            metadata.fields.insert(field, categories);
        }

        info!(
            "Fetched metadata for {table} ({}, {} fields)",
            metadata.nomis_table,
            metadata.fields.len()
        );
        Ok(metadata)
    }

    async fn get_lad_codes(&self, names: &[String]) -> Result<Vec<String>> {
        if self.lad_codes.is_empty() {
            return Err(CensusError::lookup(
                "No local authority lookup configured. Set api.lad_codes in the config file.",
            ));
        }

        names
            .iter()
            .map(|name| {
                self.lad_codes.get(name).cloned().ok_or_else(|| {
                    CensusError::lookup(format!("Unknown local authority '{name}'"))
                })
            })
            .collect()
    }

    async fn get_geo_codes(
        &self,
        coverage_codes: &[String],
        resolution: Resolution,
    ) -> Result<AreaCodeList> {
        let mut codes = Vec::new();
        for coverage in coverage_codes {
            let url = self.geography_def_url(coverage, resolution)?;
            let found = code_values(self.fetch_structure(&url).await?);
            if found.is_empty() {
                warn!("{coverage} does not appear to be a valid area for {resolution}");
            }
            codes.extend(found);
        }

        if codes.is_empty() {
            return Err(CensusError::lookup(format!(
                "No {resolution} areas found for {}",
                coverage_codes.join(",")
            )));
        }
        Ok(AreaCodeList::new(codes))
    }

    async fn get_data(
        &self,
        table: &str,
        nomis_table: &str,
        params: &mut QueryParameters,
    ) -> Result<PathBuf> {
        let path = data_path(&self.config.cache_dir, nomis_table, &self.get_url(nomis_table, params));
        if path.exists() {
            info!("Using cached data for {table}: {}", path.display());
            return Ok(path);
        }

        if let Some(key) = &self.config.api_key {
            params.insert(CREDENTIAL_KEY, key.as_str());
        } else {
            warn!("No API key set; Nomisweb limits keyless queries");
        }

        let body = self.fetch_text(&self.get_url(nomis_table, params)).await?;
        write_cache_file(&path, &body)?;
        Ok(path)
    }

    fn get_url(&self, nomis_table: &str, params: &QueryParameters) -> String {
        build_url(&self.config.base_url, nomis_table, params)
    }

    fn cache_dir(&self) -> &Path {
        &self.config.cache_dir
    }
}

/// Loads a local authority name to code lookup from a JSON object file.
///
/// Codes may be given as strings or numbers.
pub fn load_lad_codes(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CensusError::config(format!(
            "Failed to read local authority lookup {}: {e}",
            path.display()
        ))
    })?;

    let raw: HashMap<String, serde_json::Value> = serde_json::from_str(&content).map_err(|e| {
        CensusError::config(format!(
            "Invalid local authority lookup {}: {e}",
            path.display()
        ))
    })?;

    Ok(raw
        .into_iter()
        .map(|(name, code)| (name, value_to_string(&code)))
        .collect())
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| CensusError::config(format!("Invalid API URL '{url}': {e}")))
}

fn parse_structure(body: &str) -> Result<SdmxStructure> {
    serde_json::from_str::<SdmxResponse>(body)
        .map(|r| r.structure)
        .map_err(|e| CensusError::api(format!("Failed to parse response: {e}")))
}

/// Picks the key family for `table`. Searches are wildcarded and may match
/// several datasets, so an exact id or `<table> - ...` title wins.
fn select_key_family(structure: SdmxStructure, table: &str) -> Result<KeyFamily> {
    let mut families = structure
        .keyfamilies
        .map(|k| k.keyfamily)
        .unwrap_or_default();

    let position = families
        .iter()
        .position(|f| f.id == table || f.name.value.starts_with(&format!("{table} ")))
        .unwrap_or(0);

    if families.is_empty() {
        return Err(CensusError::api(format!("Table '{table}' not found")));
    }
    Ok(families.swap_remove(position))
}

fn parse_categories(structure: SdmxStructure) -> Categories {
    codes(structure)
        .into_iter()
        .map(|code| (value_to_string(&code.value), code.description.value))
        .collect()
}

fn code_values(structure: SdmxStructure) -> Vec<String> {
    codes(structure)
        .iter()
        .map(|code| value_to_string(&code.value))
        .collect()
}

fn codes(structure: SdmxStructure) -> Vec<Code> {
    structure
        .codelists
        .and_then(|c| c.codelist.into_iter().next())
        .map(|c| c.code)
        .unwrap_or_default()
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// Nomisweb SDMX/JSON types

#[derive(Debug, Deserialize)]
struct SdmxResponse {
    structure: SdmxStructure,
}

#[derive(Debug, Default, Deserialize)]
struct SdmxStructure {
    #[serde(default)]
    keyfamilies: Option<KeyFamilies>,
    #[serde(default)]
    codelists: Option<Codelists>,
}

#[derive(Debug, Deserialize)]
struct KeyFamilies {
    #[serde(default)]
    keyfamily: Vec<KeyFamily>,
}

#[derive(Debug, Deserialize)]
struct KeyFamily {
    id: String,
    name: SdmxText,
    components: Components,
}

#[derive(Debug, Deserialize)]
struct Components {
    #[serde(default)]
    dimension: Vec<Dimension>,
}

#[derive(Debug, Deserialize)]
struct Dimension {
    conceptref: String,
}

#[derive(Debug, Deserialize)]
struct Codelists {
    #[serde(default)]
    codelist: Vec<Codelist>,
}

#[derive(Debug, Deserialize)]
struct Codelist {
    #[serde(default)]
    code: Vec<Code>,
}

#[derive(Debug, Deserialize)]
struct Code {
    value: serde_json::Value,
    description: SdmxText,
}

#[derive(Debug, Deserialize)]
struct SdmxText {
    value: String,
}
