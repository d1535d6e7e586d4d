//! Interactive query building.
//!
//! A session runs these steps in order, each optional step behind a yes/no
//! prompt that defaults to no:
//!
//! 1. select a table and fetch its metadata
//! 2. choose categories for each field
//! 3. (optional) attach a geography
//! 4. (optional, needs a geography) fetch the data
//! 5. strip the API credential
//! 6. write the metadata to the cache
//! 7. generate the Python and R snippets

pub mod fields;

pub use fields::{
    confirm, enumerate_fields, select_categories, FieldSelection, SelectList, DEFAULT_CATEGORY,
    DEFAULT_DATE, FREQ_FIELD, GEOGRAPHY_CODE_COLUMN, GEOGRAPHY_FIELD, MEASURES_FIELD,
    OBS_VALUE_COLUMN,
};

use crate::api::{AreaCodeList, CensusApi, QueryParameters, TableMetadata, GEOGRAPHY_KEY};
use crate::codegen::{CodeGenerator, GeneratedArtifacts};
use crate::console::Console;
use crate::error::Result;
use crate::geography::{Country, GeographyResolver, Resolution};
use std::path::PathBuf;
use tracing::{debug, info};

/// Everything a finished session produced.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub table: String,
    pub params: QueryParameters,
    pub metadata_path: PathBuf,
    pub artifacts: GeneratedArtifacts,
    /// Cached data file, if data was fetched.
    pub data_path: Option<PathBuf>,
}

/// Drives an interactive query session against one accessor.
pub struct QueryBuilder<'a, A: CensusApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: CensusApi + ?Sized> QueryBuilder<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Runs a full session, reading answers from `console`.
    ///
    /// Accessor errors are returned as-is. An invalid resolution ends the
    /// session before anything is written.
    pub async fn run<C: Console>(&self, console: &mut C) -> Result<SessionOutcome> {
        console.show("Nomisweb census data interactive query builder");
        console.show("See README.md for details on how to use this package");

        let (table, metadata) = self.select_table(console).await?;
        let mut params = enumerate_fields(&metadata, console)?;

        let mut fetched = Ok(None);
        if confirm(console, "Add geography? (y/N): ")? {
            let area_codes = self.select_geography(console).await?;
            params.insert(GEOGRAPHY_KEY, area_codes.to_query_value());
            console.show(&params.to_string());

            if confirm(console, "Get data now? (y/N): ")? {
                console.show("\n\nGetting data...");
                fetched = self
                    .api
                    .get_data(&table, &metadata.nomis_table, &mut params)
                    .await
                    .map(Some);
            }
        }

        // The credential must never reach the cache or the snippets, even
        // when the fetch failed after adding it.
        if params.strip_credential() {
            debug!("Removed API credential from query parameters");
        }
        let data_path = fetched?;

        let metadata_path = self.api.write_metadata(&table, &metadata)?;
        console.show(&format!("Writing metadata to {}", metadata_path.display()));

        let artifacts = CodeGenerator::new(self.api).emit(&table, &metadata, &params)?;
        console.show(&format!(
            "\nWriting python code snippet to {}",
            artifacts.python_path.display()
        ));
        console.show(&format!(
            "\nWriting R code snippet to {}",
            artifacts.r_path.display()
        ));

        info!(table = %table, params = %params, "Query session complete");
        Ok(SessionOutcome {
            table,
            params,
            metadata_path,
            artifacts,
            data_path,
        })
    }

    async fn select_table<C: Console>(&self, console: &mut C) -> Result<(String, TableMetadata)> {
        let table = console.prompt("Census table: ")?.trim().to_string();
        info!(table = %table, "Fetching table metadata");

        let metadata = self.api.get_metadata(&table).await?;
        console.show(&metadata.description);
        Ok((table, metadata))
    }

    async fn select_geography<C: Console>(&self, console: &mut C) -> Result<AreaCodeList> {
        let coverage = console.prompt(&format!(
            "\nGeographical coverage\n{} or LA name(s), comma separated: ",
            Country::tokens()
        ))?;
        let resolution = console.prompt(&format!("Resolution ({}): ", Resolution::labels()))?;

        let label = Resolution::canonical_label(resolution.trim());
        GeographyResolver::new(self.api)
            .resolve(coverage.trim(), label)
            .await
    }
}
