//! End-to-end query session tests.

use census_query::api::{MockCensusApi, QueryParameters, TableMetadata};
use census_query::codegen::{PYTHON_GEOGRAPHY_PLACEHOLDER, R_GEOGRAPHY_PLACEHOLDER};
use census_query::console::ScriptedConsole;
use census_query::query::QueryBuilder;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[tokio::test]
async fn test_ks401ew_scenario() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::with_ks401ew(dir.path());
    // table, CELL=0, MEASURES default, MEASURES not included, no geography
    let mut console = ScriptedConsole::new(["KS401EW", "0", "", "n", "n"]);

    let outcome = QueryBuilder::new(&api).run(&mut console).await.unwrap();

    let expected: QueryParameters = [
        ("date", "latest"),
        ("select", "GEOGRAPHY_CODE,CELL,OBS_VALUE"),
        ("CELL", "0"),
        ("MEASURES", "0"),
    ]
    .into_iter()
    .collect();
    assert_eq!(outcome.params, expected);
    let keys: Vec<&str> = outcome.params.keys().collect();
    assert_eq!(keys, vec!["date", "select", "CELL", "MEASURES"]);
    assert_eq!(outcome.table, "KS401EW");
    assert_eq!(console.remaining(), 0);
}

#[tokio::test]
async fn test_session_writes_metadata_and_snippets() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::with_ks401ew(dir.path());
    let mut console = ScriptedConsole::new(["KS401EW", "0", "", "n", "n"]);

    let outcome = QueryBuilder::new(&api).run(&mut console).await.unwrap();

    assert_eq!(outcome.metadata_path, dir.path().join("KS401EW_metadata.json"));
    let json = std::fs::read_to_string(&outcome.metadata_path).unwrap();
    assert!(json.contains("\n  \"description\": "), "metadata should be indented: {json}");
    let metadata: TableMetadata = serde_json::from_str(&json).unwrap();
    assert_eq!(metadata.nomis_table, "NM_618_1");

    let python = std::fs::read_to_string(dir.path().join("KS401EW.py")).unwrap();
    let r = std::fs::read_to_string(dir.path().join("KS401EW.R")).unwrap();
    assert!(python.contains(PYTHON_GEOGRAPHY_PLACEHOLDER));
    assert!(r.contains(R_GEOGRAPHY_PLACEHOLDER));
}

#[tokio::test]
async fn test_geography_and_fetch_never_leak_credential() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::with_ks401ew(dir.path());
    let mut console = ScriptedConsole::new([
        "KS401EW",
        "0,1",
        "",
        "n",
        "y",
        "Leeds,Manchester",
        "LSOA",
        "y",
    ]);

    let outcome = QueryBuilder::new(&api).run(&mut console).await.unwrap();

    assert!(outcome.params.has_geography());
    assert!(!outcome.params.contains_key("uid"));
    let data_path = outcome.data_path.expect("data should be fetched");
    assert!(data_path.exists());

    for path in [
        &outcome.metadata_path,
        &outcome.artifacts.python_path,
        &outcome.artifacts.r_path,
    ] {
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(!contents.contains("uid"), "{} leaks credential", path.display());
        assert!(!contents.contains("mock-api-key"));
    }
    assert!(!outcome.artifacts.python.contains(PYTHON_GEOGRAPHY_PLACEHOLDER));
    assert!(!outcome.artifacts.r.contains(R_GEOGRAPHY_PLACEHOLDER));
}

#[tokio::test]
async fn test_geography_keeps_parameter_order() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::with_ks401ew(dir.path());
    let mut console = ScriptedConsole::new(["KS401EW", "", "y", "", "", "y", "EW", "OA", ""]);

    let outcome = QueryBuilder::new(&api).run(&mut console).await.unwrap();

    let keys: Vec<&str> = outcome.params.keys().collect();
    assert_eq!(keys, vec!["date", "select", "CELL", "MEASURES", "geography"]);
    assert_eq!(outcome.params.get("select"), Some("GEOGRAPHY_CODE,CELL,OBS_VALUE"));
    assert!(outcome.data_path.is_none());
}

#[tokio::test]
async fn test_repeated_sessions_produce_identical_artifacts() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::with_ks401ew(dir.path());
    let answers = ["KS401EW", "1", "", "y", "y", "UK", "LA", "n"];

    let first = QueryBuilder::new(&api)
        .run(&mut ScriptedConsole::new(answers))
        .await
        .unwrap();
    let second = QueryBuilder::new(&api)
        .run(&mut ScriptedConsole::new(answers))
        .await
        .unwrap();

    assert_eq!(first.artifacts, second.artifacts);
    assert_eq!(first.params, second.params);
}

#[tokio::test]
async fn test_unknown_local_authority_propagates_lookup_error() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::with_ks401ew(dir.path());
    let mut console = ScriptedConsole::new(["KS401EW", "", "", "", "", "y", "Atlantis", "LA"]);

    let err = QueryBuilder::new(&api).run(&mut console).await.unwrap_err();

    assert_eq!(err.to_string(), "Lookup error: Unknown local authority 'Atlantis'");
    assert!(!err.is_fatal());
    assert!(!dir.path().join("KS401EW.py").exists());
}

#[tokio::test]
async fn test_exhausted_script_is_input_error() {
    let dir = tempdir().unwrap();
    let api = MockCensusApi::with_ks401ew(dir.path());
    let mut console = ScriptedConsole::new(["KS401EW", "0"]);

    let err = QueryBuilder::new(&api).run(&mut console).await.unwrap_err();

    assert_eq!(err.category(), "Input Error");
}
