//! Logging configuration for ukcensus-query.
//!
//! Interactive sessions log to a file so log lines don't interleave with
//! prompts; scripted (headless) sessions log to stderr.

use std::fs::{self, File};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_DIR: &str = "census-query";
const LOG_FILE: &str = "census-query.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// `census-query.log` under the platform state directory.
    File,
    /// Standard error, leaving stdout to the session transcript.
    Stderr,
}

impl LogTarget {
    /// Scripted sessions log to stderr, terminal sessions to the log file.
    pub fn for_session(headless: bool) -> Self {
        if headless {
            Self::Stderr
        } else {
            Self::File
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
///
/// If the log file can't be created, a warning is printed and logging stays
/// off; the session itself still runs.
pub fn init(target: LogTarget) {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());

    match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).init(),
        LogTarget::File => match open_log_file() {
            Ok(file) => builder.with_writer(file).with_ansi(false).init(),
            Err(e) => eprintln!("Warning: Could not open log file: {e}"),
        },
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Truncates on each run.
fn open_log_file() -> std::io::Result<File> {
    let path = get_log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

/// Returns the log file path: state dir, else config dir, else temp dir.
pub fn get_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::config_dir)
        .map(|dir| dir.join(LOG_DIR).join(LOG_FILE))
        .unwrap_or_else(|| std::env::temp_dir().join(LOG_FILE))
}
