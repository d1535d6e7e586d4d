//! Code snippet generation tests.

use census_query::api::{CensusApi, MockCensusApi, QueryParameters, TableMetadata};
use census_query::codegen::{CodeGenerator, PYTHON_GEOGRAPHY_PLACEHOLDER, R_GEOGRAPHY_PLACEHOLDER};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn metadata() -> TableMetadata {
    TableMetadata::new("QS101EW - Residence type", "NM_501_1")
        .with_field("RURAL_URBAN", [("0", "Total")])
        .with_field("CELL", [("0", "All"), ("1", "Household"), ("2", "Communal")])
}

fn params(geography: bool) -> QueryParameters {
    let mut params: QueryParameters = [
        ("date", "latest"),
        ("select", "GEOGRAPHY_CODE,CELL,OBS_VALUE"),
        ("RURAL_URBAN", "0"),
        ("CELL", "1,2"),
    ]
    .into_iter()
    .collect();
    if geography {
        params.insert("geography", "2092957697");
    }
    params
}

#[test]
fn test_full_python_snippet() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::new(dir.path());

    let python = CodeGenerator::new(&api).render_python("QS101EW", &metadata(), &params(true));

    let expected = format!(
        "\"\"\"\n\
QS101EW - Residence type\n\
\n\
Code autogenerated by UKCensusAPI\n\
(https://github.com/virgesmith/UKCensusAPI)\n\
\"\"\"\n\
\n\
# This code requires an API key, see the README.md for details\n\
\n\
# Query url:\n\
# {url}\n\
\n\
import ukcensusapi.Nomisweb as CensusApi\n\
\n\
API = CensusApi.Nomisweb(\"{cache}\")\n\
TABLE = \"QS101EW\"\n\
TABLE_INTERNAL = \"NM_501_1\"\n\
query_params = {{\n\
\x20 \"date\": \"latest\",\n\
\x20 \"select\": \"GEOGRAPHY_CODE,CELL,OBS_VALUE\",\n\
\x20 \"RURAL_URBAN\": \"0\",\n\
\x20 \"CELL\": \"1,2\",\n\
\x20 \"geography\": \"2092957697\",\n\
}}\n\
\n\
data = API.get_data(TABLE, TABLE_INTERNAL, query_params)\n",
        url = api.get_url("NM_501_1", &params(true)),
        cache = dir.path().display(),
    );
    assert_eq!(python, expected);
}

#[test]
fn test_r_snippet_structure() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::new(dir.path());

    let r = CodeGenerator::new(&api).render_r("QS101EW", &metadata(), &params(false));

    let lines: Vec<&str> = r.lines().collect();
    assert_eq!(lines[0], "# QS101EW - Residence type");
    assert!(lines.contains(&"library(\"UKCensusAPI\")"));
    assert!(lines.contains(&"api = UKCensusAPI::instance(cacheDir)"));
    assert!(lines.contains(&"table_internal = \"NM_501_1\""));
    assert!(lines.contains(&"  CELL = \"1,2\""));
    assert!(lines.contains(&R_GEOGRAPHY_PLACEHOLDER));
    assert_eq!(
        lines.last(),
        Some(&"QS101EW = UKCensusAPI::getData(api, table, table_internal, queryParams)")
    );
}

#[test]
fn test_placeholder_tracks_geography() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::new(dir.path());
    let generator = CodeGenerator::new(&api);

    let without = generator.emit("QS101EW", &metadata(), &params(false)).unwrap();
    assert!(without.python.contains(PYTHON_GEOGRAPHY_PLACEHOLDER));
    assert!(without.r.contains(R_GEOGRAPHY_PLACEHOLDER));

    let with = generator.emit("QS101EW", &metadata(), &params(true)).unwrap();
    assert!(!with.python.contains(PYTHON_GEOGRAPHY_PLACEHOLDER));
    assert!(!with.r.contains(R_GEOGRAPHY_PLACEHOLDER));
}

#[test]
fn test_emit_is_byte_identical() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::new(dir.path());
    let generator = CodeGenerator::new(&api);

    let first = generator.emit("QS101EW", &metadata(), &params(true)).unwrap();
    let python_bytes = std::fs::read(&first.python_path).unwrap();
    let r_bytes = std::fs::read(&first.r_path).unwrap();

    let second = generator.emit("QS101EW", &metadata(), &params(true)).unwrap();
    assert_eq!(std::fs::read(&second.python_path).unwrap(), python_bytes);
    assert_eq!(std::fs::read(&second.r_path).unwrap(), r_bytes);
}

#[test]
fn test_description_quotes_are_escaped() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::new(dir.path());
    let meta = TableMetadata::new("A \"\"\"quoted\"\"\" title", "NM_1_1");

    let python = CodeGenerator::new(&api).render_python("T1", &meta, &params(false));

    assert_eq!(python.matches("\"\"\"").count(), 2);
}
