use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::calendar::{AdjustmentOptions, NormalizationPolicy};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Monthly rental aggregation with seasonal calendar adjustment
#[derive(Parser, Debug, Clone)]
#[command(
    name = "rental-report",
    about = "Monthly rental aggregation with seasonal calendar adjustment",
    version
)]
pub struct Settings {
    /// Directory containing the CSV record files and machine calendar
    #[arg(long)]
    pub data_path: Option<PathBuf>,

    /// Which dataset to report on
    #[arg(long, default_value = "both", value_parser = ["actual", "forecast", "both"])]
    pub view: String,

    /// Machine (equipment type) to report on
    #[arg(long)]
    pub machine: Option<String>,

    /// Year to report on (defaults: latest actual year, earliest forecast year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Apply the calendar adjustment to the actual dataset
    #[arg(long)]
    pub adjust_actual: bool,

    /// Skip the calendar adjustment on the forecast dataset
    #[arg(long)]
    pub no_adjust_forecast: bool,

    /// Weight multiplier for peak months
    #[arg(long, default_value = "1.2")]
    pub boost: f64,

    /// Weight multiplier for non-peak months
    #[arg(long, default_value = "0.9")]
    pub base: f64,

    /// Year-total compensation policy for the adjustment
    #[arg(long, default_value = "annual-total", value_parser = ["annual-total", "weight-mean", "off"])]
    pub normalization: String,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.rental-report/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalization: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.rental-report/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".rental-report").join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load persisted params from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to the default path, creating parent directories
    /// if needed.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::config_path())
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the default config file if it exists.
    pub fn clear() -> Result<(), std::io::Error> {
        Self::clear_at(&Self::config_path())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`load_with_last_used`] but accepts an explicit argument list,
    /// enabling unit-testing without spawning subprocesses.
    pub fn load_with_last_used_from_args(args: Vec<std::ffi::OsString>) -> Self {
        Self::load_with_last_used_impl(args, &LastUsedParams::config_path())
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        // Build raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());

        // Parse into the typed struct using the same args.
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            // Apply flag overrides and return without re-persisting.
            return Self::apply_overrides(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // Merge last-used values for fields that were NOT explicitly set on the
        // command line (CLI always wins). Paths and years are never loaded
        // from last-used; year defaults depend on the dataset at hand.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "machine") && settings.machine.is_none() {
            settings.machine = last.machine;
        }
        if !is_arg_explicitly_set(&matches, "boost") {
            if let Some(v) = last.boost {
                settings.boost = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "base") {
            if let Some(v) = last.base {
                settings.base = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "normalization") {
            if let Some(v) = last.normalization {
                settings.normalization = v;
            }
        }

        settings = Self::apply_overrides(settings);

        // Persist current settings for next run.
        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Whether the forecast dataset gets the calendar adjustment.
    pub fn adjust_forecast(&self) -> bool {
        !self.no_adjust_forecast
    }

    /// The compensation policy parsed from the flag string.
    ///
    /// Unknown names (possible via a hand-edited last-used file) fall back to
    /// the default rather than failing the run.
    pub fn normalization_policy(&self) -> NormalizationPolicy {
        NormalizationPolicy::from_name(&self.normalization)
            .unwrap_or(NormalizationPolicy::AnnualTotal)
    }

    /// Adjustment parameters assembled from the flags.
    pub fn adjustment_options(&self) -> AdjustmentOptions {
        AdjustmentOptions {
            boost_factor: self.boost,
            base_factor: self.base,
            normalization: self.normalization_policy(),
        }
    }

    /// Apply the `--debug` flag override.
    fn apply_overrides(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            machine: s.machine.clone(),
            view: Some(s.view.clone()),
            boost: Some(s.boost),
            base: Some(s.base),
            normalization: Some(s.normalization.clone()),
        }
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
