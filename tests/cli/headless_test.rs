//! Scripted-mode tests for the ukcensus-query binary.

use super::common::{run, Workspace};

#[test]
fn test_scripted_session_writes_artifacts() {
    let ws = Workspace::new();

    let (code, stdout, stderr) = ws.run_script(&["KS401EW", "0", "", "n", "n"]);

    assert_eq!(code, 0, "Expected exit code 0, stderr: {stderr}");
    assert!(stdout.contains("Census table: KS401EW"), "{stdout}");
    assert!(stdout.contains("Add geography? (y/N): n"));
    for file in ["KS401EW_metadata.json", "KS401EW.py", "KS401EW.R"] {
        assert!(ws.cache_dir().join(file).exists(), "{file} not written");
    }
}

#[test]
fn test_scripted_session_with_geography_and_data() {
    let ws = Workspace::new();

    let (code, _, stderr) =
        ws.run_script(&["KS401EW", "1", "", "y", "y", "EW", "MSOA", "y"]);

    assert_eq!(code, 0, "stderr: {stderr}");
    let python = std::fs::read_to_string(ws.cache_dir().join("KS401EW.py")).unwrap();
    assert!(python.contains("\"geography\": "));
    assert!(!python.contains("mock-api-key"));

    let cached_data = std::fs::read_dir(ws.cache_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| e.file_name().to_string_lossy().ends_with(".tsv"));
    assert!(cached_data, "Expected a cached .tsv file");
}

#[test]
fn test_invalid_resolution_exits_with_code_2() {
    let ws = Workspace::new();

    let (code, _, stderr) = ws.run_script(&["KS401EW", "0", "", "n", "y", "UK", "WARD"]);

    assert_eq!(code, 2, "Expected exit code 2 for invalid resolution");
    assert!(stderr.contains("Invalid resolution: WARD"), "{stderr}");
    assert!(!ws.cache_dir().join("KS401EW.py").exists());
}

#[test]
fn test_unknown_table_exits_with_code_1() {
    let ws = Workspace::new();

    let (code, _, stderr) = ws.run_script(&["QS999EW"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Table 'QS999EW' not found"), "{stderr}");
}

#[test]
fn test_help_lists_options() {
    let (code, stdout, _) = run(&["--help"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("--cache-dir"));
    assert!(stdout.contains("--script"));
    assert!(stdout.contains("--mock-api"));
}
