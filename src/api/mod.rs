//! Census data API abstraction for census-query.
//!
//! Provides a trait-based interface to the data provider, allowing the
//! query builder to run against Nomisweb or an in-memory mock.

mod mock;
mod nomisweb;
mod types;

pub use mock::{ApiCall, MockCensusApi};
pub use nomisweb::{load_lad_codes, NomiswebClient, NomiswebConfig};
pub use types::{
    AreaCodeList, Categories, QueryParameters, TableMetadata, CREDENTIAL_KEY, DATE_KEY,
    GEOGRAPHY_KEY, SELECT_KEY,
};

use crate::error::{CensusError, Result};
use crate::geography::Resolution;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;
use url::form_urlencoded;

/// Default Nomisweb base URL.
pub const NOMISWEB_URL: &str = "https://www.nomisweb.co.uk/";

/// Trait defining the interface to the census data provider.
///
/// Network operations are async and return Results with CensusError.
#[async_trait]
pub trait CensusApi: Send + Sync {
    /// Fetches the metadata for a census table (e.g. `KS401EW`).
    async fn get_metadata(&self, table: &str) -> Result<TableMetadata>;

    /// Maps local authority names to provider codes, preserving order.
    async fn get_lad_codes(&self, names: &[String]) -> Result<Vec<String>>;

    /// Expands coverage codes into all areas of the given resolution.
    async fn get_geo_codes(
        &self,
        coverage_codes: &[String],
        resolution: Resolution,
    ) -> Result<AreaCodeList>;

    /// Fetches the data for a query and caches it, returning the cache path.
    ///
    /// Implementations may add the `uid` credential to `params` for the
    /// duration of the request; callers strip it afterwards.
    async fn get_data(
        &self,
        table: &str,
        nomis_table: &str,
        params: &mut QueryParameters,
    ) -> Result<PathBuf>;

    /// Reconstructs the query URL for `params`.
    fn get_url(&self, nomis_table: &str, params: &QueryParameters) -> String;

    /// Writes table metadata to the cache, returning the file path.
    fn write_metadata(&self, table: &str, metadata: &TableMetadata) -> Result<PathBuf> {
        let path = metadata_path(self.cache_dir(), table);
        let json = serde_json::to_string_pretty(metadata)
            .map_err(|e| CensusError::internal(format!("Failed to serialize metadata: {e}")))?;
        write_cache_file(&path, &json)?;
        Ok(path)
    }

    /// Base directory for all cached and generated artifacts.
    fn cache_dir(&self) -> &Path;
}

/// Builds a data query URL with parameters sorted by name.
///
/// Sorting keeps the URL, and therefore the cache key, independent of the
/// order parameters were chosen in.
pub fn build_url(base_url: &str, nomis_table: &str, params: &QueryParameters) -> String {
    let mut pairs: Vec<(&str, &str)> = params.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();

    format!("{base_url}api/v01/dataset/{nomis_table}.data.tsv?{query}")
}

/// Returns the metadata cache path for a table.
pub fn metadata_path(cache_dir: &Path, table: &str) -> PathBuf {
    cache_dir.join(format!("{table}_metadata.json"))
}

/// Returns the data cache path for a query URL.
pub fn data_path(cache_dir: &Path, nomis_table: &str, url: &str) -> PathBuf {
    let hash = blake3::hash(url.as_bytes()).to_hex();
    cache_dir.join(format!("{nomis_table}_{}.tsv", &hash[..16]))
}

/// Writes a whole file under the cache directory, creating parents.
pub fn write_cache_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            CensusError::io(format!(
                "Failed to create cache directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    std::fs::write(path, contents)
        .map_err(|e| CensusError::io(format!("Failed to write {}: {e}", path.display())))?;
    info!("Wrote {}", path.display());
    Ok(())
}
