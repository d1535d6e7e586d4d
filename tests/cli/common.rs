//! Common utilities for binary tests.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// A scratch cache directory plus the answer script written into it.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `answers` one per line and runs the binary against the mock API.
    pub fn run_script(&self, answers: &[&str]) -> (i32, String, String) {
        let script = self.dir.path().join("answers.txt");
        std::fs::write(&script, format!("{}\n", answers.join("\n")))
            .expect("Failed to write script");
        let config = self.dir.path().join("missing-config.toml");

        run(&[
            "--mock-api",
            "--script",
            script.to_str().expect("utf-8 path"),
            "--cache-dir",
            self.cache_dir().to_str().expect("utf-8 path"),
            "--config",
            config.to_str().expect("utf-8 path"),
        ])
    }
}

/// Runs ukcensus-query with the given arguments.
pub fn run(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_ukcensus-query"))
        .args(args)
        .env_remove("NOMIS_API_KEY")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}
