use std::path::{Path, PathBuf};

use rental_core::error::{RentalError, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application directory name under the user's home.
const APP_DIR_NAME: &str = ".rental-report";
/// Conventional data directory name, also tried relative to the cwd.
const DATA_DIR_NAME: &str = "data";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.rental-report/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.rental-report/`
/// - `~/.rental-report/logs/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    ensure_directories_in(&home)
}

/// [`ensure_directories`] against an explicit base directory.
pub fn ensure_directories_in(home: &Path) -> anyhow::Result<()> {
    let app_dir = home.join(APP_DIR_NAME);
    std::fs::create_dir_all(&app_dir)?;
    std::fs::create_dir_all(app_dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` accepts the Python-style names offered by the CLI and is
/// mapped to a [`tracing_subscriber::EnvFilter`] directive, falling back to
/// `"info"` when unrecognised. Console events go to stderr so the report on
/// stdout stays pipeable; when `log_file` is set, the same events are also
/// written there without ANSI escapes.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(normalize_level(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

/// Map a CLI log-level name to a tracing directive (tracing uses lowercase).
fn normalize_level(log_level: &str) -> String {
    let upper = log_level.to_uppercase();
    match upper.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" | "CRITICAL" => "error",
        _ => return log_level.to_lowercase(),
    }
    .to_string()
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Locate the rental data directory.
///
/// An explicit `cli_path` wins, but must exist. Otherwise the first existing
/// candidate is used, in order:
/// 1. `./data/`
/// 2. `~/.rental-report/data/`
pub fn discover_data_path(cli_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = cli_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(RentalError::DataPathNotFound(path.to_path_buf()));
    }

    candidate_data_paths(dirs::home_dir())
        .into_iter()
        .find(|path| path.exists())
        .ok_or_else(|| RentalError::DataPathNotFound(PathBuf::from(DATA_DIR_NAME)))
}

/// Candidate data directories, in precedence order.
fn candidate_data_paths(home: Option<PathBuf>) -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(DATA_DIR_NAME)];
    if let Some(home) = home {
        candidates.push(home.join(APP_DIR_NAME).join(DATA_DIR_NAME));
    }
    candidates
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── ensure_directories ────────────────────────────────────────────────────

    #[test]
    fn test_ensure_directories_in() {
        let tmp = TempDir::new().expect("tempdir");

        ensure_directories_in(tmp.path()).expect("ensure_directories_in should succeed");

        let app_dir = tmp.path().join(".rental-report");
        assert!(app_dir.is_dir(), ".rental-report dir must exist");
        assert!(app_dir.join("logs").is_dir(), "logs subdir must exist");
    }

    #[test]
    fn test_ensure_directories_in_is_idempotent() {
        let tmp = TempDir::new().expect("tempdir");
        ensure_directories_in(tmp.path()).expect("first call");
        ensure_directories_in(tmp.path()).expect("second call");
    }

    // ── discover_data_path ────────────────────────────────────────────────────

    #[test]
    fn test_discover_data_path_cli_override() {
        let tmp = TempDir::new().expect("tempdir");
        let path = discover_data_path(Some(tmp.path())).expect("existing override");
        assert_eq!(path, tmp.path());
    }

    #[test]
    fn test_discover_data_path_cli_override_missing() {
        let missing = Path::new("/tmp/does-not-exist-rental-report-xyz");
        let result = discover_data_path(Some(missing));
        assert!(matches!(result, Err(RentalError::DataPathNotFound(_))));
    }

    #[test]
    fn test_candidate_data_paths_with_home() {
        let home = PathBuf::from("/home/someone");
        let candidates = candidate_data_paths(Some(home));
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0], PathBuf::from("data"));
        assert_eq!(
            candidates[1],
            PathBuf::from("/home/someone/.rental-report/data")
        );
    }

    #[test]
    fn test_candidate_data_paths_without_home() {
        let candidates = candidate_data_paths(None);
        assert_eq!(candidates, vec![PathBuf::from("data")]);
    }

    // ── normalize_level ───────────────────────────────────────────────────────

    #[test]
    fn test_normalize_level_known_names() {
        assert_eq!(normalize_level("DEBUG"), "debug");
        assert_eq!(normalize_level("info"), "info");
        assert_eq!(normalize_level("Warning"), "warn");
        assert_eq!(normalize_level("ERROR"), "error");
        assert_eq!(normalize_level("CRITICAL"), "error");
    }

    #[test]
    fn test_normalize_level_passthrough() {
        assert_eq!(normalize_level("trace"), "trace");
        assert_eq!(normalize_level("rental_core=debug"), "rental_core=debug");
    }
}
