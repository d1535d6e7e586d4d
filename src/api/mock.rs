//! Mock census API for testing.
//!
//! Provides a fixture-backed accessor for headless runs and tests. Every
//! call is recorded so tests can assert on the exact lookups made.

use super::{
    build_url, data_path, write_cache_file, AreaCodeList, CensusApi, QueryParameters,
    TableMetadata, CREDENTIAL_KEY, NOMISWEB_URL, SELECT_KEY,
};
use crate::error::{CensusError, Result};
use crate::geography::{Country, Resolution};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Credential the mock injects during `get_data`.
const MOCK_API_KEY: &str = "mock-api-key";

/// A recorded accessor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    GetMetadata(String),
    GetLadCodes(Vec<String>),
    GetGeoCodes(Vec<String>, Resolution),
    GetData { table: String, nomis_table: String },
}

/// A mock census API that serves predefined tables and area codes.
pub struct MockCensusApi {
    cache_dir: PathBuf,
    tables: HashMap<String, TableMetadata>,
    lad_codes: HashMap<String, String>,
    geo_codes: HashMap<(String, Resolution), Vec<String>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl MockCensusApi {
    /// Creates an empty mock writing into `cache_dir`.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            tables: HashMap::new(),
            lad_codes: HashMap::new(),
            geo_codes: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock serving the KS401EW dwellings table.
    ///
    /// Every country token and the `Leeds` and `Manchester` local
    /// authorities resolve at every resolution.
    pub fn with_ks401ew(cache_dir: impl Into<PathBuf>) -> Self {
        let metadata = TableMetadata::new(
            "KS401EW - Dwellings, household spaces and accommodation type",
            "NM_618_1",
        )
        .with_field("GEOGRAPHY", [("2092957703", "England and Wales")])
        .with_field("CELL", [("0", "All"), ("1", "Owned")])
        .with_field("MEASURES", [("20100", "Value")])
        .with_field("FREQ", [("A", "Annually")]);

        let mut mock = Self::new(cache_dir)
            .with_table("KS401EW", metadata)
            .with_lad_code("Leeds", "1946157127")
            .with_lad_code("Manchester", "1946157089");

        let coverage: Vec<&str> = ["E", "EW", "GB", "UK"]
            .into_iter()
            .filter_map(Country::parse)
            .map(Country::nomis_code)
            .chain(["1946157127", "1946157089"])
            .collect();

        for (offset, code) in coverage.into_iter().enumerate() {
            for (index, resolution) in Resolution::all().enumerate() {
                let base = 1_100_000_000 + (offset as u64) * 100_000 + (index as u64) * 1_000;
                let codes = (base..base + 3).map(|c| c.to_string()).collect();
                mock = mock.with_geo_codes(code, resolution, codes);
            }
        }

        mock
    }

    /// Adds a table.
    pub fn with_table(mut self, table: impl Into<String>, metadata: TableMetadata) -> Self {
        self.tables.insert(table.into(), metadata);
        self
    }

    /// Adds a local authority name to code mapping.
    pub fn with_lad_code(mut self, name: impl Into<String>, code: impl Into<String>) -> Self {
        self.lad_codes.insert(name.into(), code.into());
        self
    }

    /// Sets the area codes returned for one coverage code at one resolution.
    pub fn with_geo_codes(
        mut self,
        coverage_code: impl Into<String>,
        resolution: Resolution,
        codes: Vec<String>,
    ) -> Self {
        self.geo_codes.insert((coverage_code.into(), resolution), codes);
        self
    }

    /// Returns the fixture codes for one coverage code at one resolution.
    pub fn geo_codes_for(&self, coverage_code: &str, resolution: Resolution) -> AreaCodeList {
        self.geo_codes
            .get(&(coverage_code.to_string(), resolution))
            .cloned()
            .map(AreaCodeList::new)
            .unwrap_or_default()
    }

    /// Returns all calls made so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: ApiCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl CensusApi for MockCensusApi {
    async fn get_metadata(&self, table: &str) -> Result<TableMetadata> {
        self.record(ApiCall::GetMetadata(table.to_string()));
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| CensusError::api(format!("Table '{table}' not found")))
    }

    async fn get_lad_codes(&self, names: &[String]) -> Result<Vec<String>> {
        self.record(ApiCall::GetLadCodes(names.to_vec()));
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
        self.record(ApiCall::GetGeoCodes(coverage_codes.to_vec(), resolution));
        let mut codes = Vec::new();
        for coverage in coverage_codes {
            let found = self
                .geo_codes
                .get(&(coverage.clone(), resolution))
                .ok_or_else(|| {
                    CensusError::lookup(format!("No {resolution} areas for '{coverage}'"))
                })?;
            codes.extend(found.iter().cloned());
        }
        Ok(AreaCodeList::new(codes))
    }

    async fn get_data(
        &self,
        table: &str,
        nomis_table: &str,
        params: &mut QueryParameters,
    ) -> Result<PathBuf> {
        self.record(ApiCall::GetData {
            table: table.to_string(),
            nomis_table: nomis_table.to_string(),
        });

        let path = data_path(&self.cache_dir, nomis_table, &self.get_url(nomis_table, params));
        params.insert(CREDENTIAL_KEY, MOCK_API_KEY);

        let header = params.get(SELECT_KEY).unwrap_or_default().replace(',', "\t");
        write_cache_file(&path, &format!("{header}\n"))?;
        Ok(path)
    }

    fn get_url(&self, nomis_table: &str, params: &QueryParameters) -> String {
        build_url(NOMISWEB_URL, nomis_table, params)
    }

    fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}
