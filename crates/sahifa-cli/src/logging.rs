//! Logging setup
//!
//! Filter comes from RUST_LOG when set, otherwise warnings only (debug with
//! --verbose). Logs go to `log_file` when configured, else stderr.

use std::fs::{File, OpenOptions};
use std::path::Path;

use sahifa_core::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn default_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "warn" };
    format!("sahifa_core={},sahifa_cli={}", level, level)
}

/// Install the global subscriber; later calls are ignored
pub fn init_logging(config: &Config, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new(default_filter(true))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(false)))
    };

    if let Some(log_path) = config.log_file.as_deref() {
        if let Some(log_file) = open_log_file(log_path) {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(log_file)
                .try_init();

            info!("Logging to {:?}", log_path);
            return;
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Open `path` for appending; `None` (after a warning) sends logs to stderr
fn open_log_file(path: &Path) -> Option<File> {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!(
                "Warning: Could not open log file {:?}: {}. Logging to stderr.",
                path, e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "sahifa_core=warn,sahifa_cli=warn");
        assert_eq!(default_filter(true), "sahifa_core=debug,sahifa_cli=debug");
    }

    #[test]
    fn test_open_log_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("sahifa.log");
        assert!(open_log_file(&path).is_some());
        assert!(path.exists());
    }

    #[test]
    fn test_unopenable_log_file_falls_back() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("sahifa.log");
        assert!(open_log_file(&path).is_none());
    }
}
