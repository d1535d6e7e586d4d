//! Code snippet generation.
//!
//! Renders a finished query as Python and R source that reproduces it with
//! the UKCensusAPI packages, and writes both next to the cached metadata.

use crate::api::{CensusApi, QueryParameters, TableMetadata};
use crate::error::Result;
use std::path::PathBuf;
use tracing::info;

/// Placeholder emitted in Python snippets for queries without geography.
pub const PYTHON_GEOGRAPHY_PLACEHOLDER: &str = "# TODO query_params[\"geography\"] = ...";

/// Placeholder emitted in R snippets for queries without geography.
pub const R_GEOGRAPHY_PLACEHOLDER: &str = "# TODO add geography parameter to this query...";

const ATTRIBUTION: &str = "Code autogenerated by UKCensusAPI";
const PROJECT_URL: &str = "(https://github.com/virgesmith/UKCensusAPI)";
const API_KEY_NOTE: &str = "# This code requires an API key, see the README.md for details";

/// The two generated snippets and where they were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifacts {
    pub python: String,
    pub python_path: PathBuf,
    pub r: String,
    pub r_path: PathBuf,
}

/// Generates code snippets for queries against one accessor.
pub struct CodeGenerator<'a, A: CensusApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: CensusApi + ?Sized> CodeGenerator<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Renders both snippets and writes them to `<cache_dir>/<table>.py`
    /// and `<cache_dir>/<table>.R`.
    pub fn emit(
        &self,
        table: &str,
        metadata: &TableMetadata,
        params: &QueryParameters,
    ) -> Result<GeneratedArtifacts> {
        let cache_dir = self.api.cache_dir();
        let python_path = cache_dir.join(format!("{table}.py"));
        let r_path = cache_dir.join(format!("{table}.R"));

        let python = self.render_python(table, metadata, params);
        info!("Writing Python code snippet to {}", python_path.display());
        crate::api::write_cache_file(&python_path, &python)?;

        let r = self.render_r(table, metadata, params);
        info!("Writing R code snippet to {}", r_path.display());
        crate::api::write_cache_file(&r_path, &r)?;

        Ok(GeneratedArtifacts {
            python,
            python_path,
            r,
            r_path,
        })
    }

    /// Renders the Python snippet.
    pub fn render_python(
        &self,
        table: &str,
        metadata: &TableMetadata,
        params: &QueryParameters,
    ) -> String {
        let url = self.api.get_url(&metadata.nomis_table, params);
        let cache_dir = self.api.cache_dir().display().to_string();

        let mut lines = vec![
            "\"\"\"".to_string(),
            docstring_text(&metadata.description),
            String::new(),
            ATTRIBUTION.to_string(),
            PROJECT_URL.to_string(),
            "\"\"\"".to_string(),
            String::new(),
            API_KEY_NOTE.to_string(),
            String::new(),
            "# Query url:".to_string(),
            format!("# {url}"),
            String::new(),
            "import ukcensusapi.Nomisweb as CensusApi".to_string(),
            String::new(),
            format!("API = CensusApi.Nomisweb({})", quote(&cache_dir)),
            format!("TABLE = {}", quote(table)),
            format!("TABLE_INTERNAL = {}", quote(&metadata.nomis_table)),
            "query_params = {".to_string(),
        ];
        lines.extend(
            params
                .iter()
                .map(|(key, value)| format!("  {}: {},", quote(key), quote(value))),
        );
        lines.push("}".to_string());
        if !params.has_geography() {
            lines.push(PYTHON_GEOGRAPHY_PLACEHOLDER.to_string());
        }
        lines.push(String::new());
        lines.push("data = API.get_data(TABLE, TABLE_INTERNAL, query_params)".to_string());

        format!("{}\n", lines.join("\n"))
    }

    /// Renders the R snippet.
    pub fn render_r(&self, table: &str, metadata: &TableMetadata, params: &QueryParameters) -> String {
        let url = self.api.get_url(&metadata.nomis_table, params);
        let cache_dir = self.api.cache_dir().display().to_string();

        let mut lines: Vec<String> = metadata
            .description
            .lines()
            .map(|line| format!("# {line}"))
            .collect();
        lines.extend([
            String::new(),
            format!("# {ATTRIBUTION}"),
            format!("# {PROJECT_URL}"),
            String::new(),
            API_KEY_NOTE.to_string(),
            String::new(),
            "# Query url:".to_string(),
            format!("# {url}"),
            String::new(),
            "library(\"UKCensusAPI\")".to_string(),
            String::new(),
            format!("cacheDir = {}", quote(&cache_dir)),
            "api = UKCensusAPI::instance(cacheDir)".to_string(),
            format!("table = {}", quote(table)),
            format!("table_internal = {}", quote(&metadata.nomis_table)),
            "queryParams = list(".to_string(),
        ]);

        // R rejects a trailing comma in list().
        let entries: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("  {} = {}", r_name(key), quote(value)))
            .collect();
        lines.push(entries.join(",\n"));
        lines.push(")".to_string());
        if !params.has_geography() {
            lines.push(R_GEOGRAPHY_PLACEHOLDER.to_string());
        }
        lines.push(String::new());
        lines.push(format!(
            "{} = UKCensusAPI::getData(api, table, table_internal, queryParams)",
            r_name(table)
        ));

        format!("{}\n", lines.join("\n"))
    }
}

/// Escapes description text for a Python docstring.
fn docstring_text(description: &str) -> String {
    description
        .replace('\\', "\\\\")
        .replace("\"\"\"", "\\\"\\\"\\\"")
}

/// Quotes a string literal valid in both Python and R.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Returns `name` as an R identifier, backquoting non-syntactic names.
fn r_name(name: &str) -> String {
    let mut chars = name.chars();
    let syntactic = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '.')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
    if syntactic {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "\\`"))
    }
}
