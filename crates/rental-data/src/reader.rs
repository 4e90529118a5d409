//! CSV file discovery and loading for the rental report.
//!
//! Reads sub-monthly rental record files and the machine calendar JSON from
//! a data directory and converts them into [`RentalRecord`] structs for
//! downstream aggregation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use rental_core::calendar::SeasonalCalendar;
use rental_core::error::{RentalError, Result};
use rental_core::models::{RentalRecord, SubPeriod};
use tracing::{debug, warn};

/// File name of the machine calendar, resolved against the data directory.
pub const CALENDAR_FILE_NAME: &str = "machine_calendar.json";

// ── Public API ────────────────────────────────────────────────────────────────

/// A loaded pair of record sets: observed history and precomputed forecasts.
#[derive(Debug, Clone, Default)]
pub struct RentalDataset {
    /// Records from observed-history files, carrying `rental_count` values.
    pub actual: Vec<RentalRecord>,
    /// Records from forecast files, carrying `pred_rental_count` values.
    pub forecast: Vec<RentalRecord>,
}

/// Find all `.csv` files recursively under `data_path`, sorted by path.
pub fn find_csv_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "csv")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every CSV file under `data_path` into a [`RentalDataset`].
///
/// Files whose stem contains `forecast` (any case) land in the forecast set,
/// everything else in the actual set. A file that cannot be read or parsed
/// is skipped with a warning; the load fails only when not a single file
/// could be loaded.
pub fn load_rental_dataset(data_path: &Path) -> Result<RentalDataset> {
    let csv_files = find_csv_files(data_path);

    let mut dataset = RentalDataset::default();
    let mut files_loaded = 0usize;

    for file_path in &csv_files {
        let records = match load_records_from_file(file_path) {
            Ok(records) => records,
            Err(e) => {
                warn!("Skipping {}: {}", file_path.display(), e);
                continue;
            }
        };
        files_loaded += 1;
        if is_forecast_file(file_path) {
            dataset.forecast.extend(records);
        } else {
            dataset.actual.extend(records);
        }
    }

    if files_loaded == 0 {
        return Err(RentalError::NoDataFiles(data_path.to_path_buf()));
    }

    debug!(
        "Loaded {} actual and {} forecast records from {} files",
        dataset.actual.len(),
        dataset.forecast.len(),
        files_loaded
    );

    Ok(dataset)
}

/// Load and parse a single CSV record file.
///
/// Header names are matched case-insensitively with underscores ignored (a
/// leading BOM is stripped), so `avgTemp`, `avgtemp` and `avg_temp` all
/// resolve. Rows missing a machine name, an intelligible year or month, or
/// a known sub-period token are skipped with a warning; numeric measurement
/// fields that are absent or malformed are coerced to 0.
pub fn load_records_from_file(path: &Path) -> Result<Vec<RentalRecord>> {
    let file = std::fs::File::open(path).map_err(|source| RentalError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| RentalError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .clone();
    let header_map = build_header_map(&headers);

    let mut records: Vec<RentalRecord> = Vec::new();
    let mut rows_read = 0u64;
    let mut rows_skipped = 0u64;

    for (index, row_result) in reader.records().enumerate() {
        // The header occupies line 1, so the first record is line 2.
        let line = index + 2;
        let row = match row_result {
            Ok(row) => row,
            Err(e) => {
                warn!("{}:{}: unreadable row: {}", path.display(), line, e);
                rows_skipped += 1;
                continue;
            }
        };
        rows_read += 1;

        match parse_row(&row, &header_map) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!("{}:{}: {}", path.display(), line, reason);
                rows_skipped += 1;
            }
        }
    }

    debug!(
        "File {}: {} rows read, {} parsed, {} skipped",
        path.display(),
        rows_read,
        records.len(),
        rows_skipped,
    );

    Ok(records)
}

/// Load the machine calendar JSON mapping machine names to peak months.
///
/// A missing file is normal and yields an empty calendar, which disables
/// the adjustment for every machine. A file that exists but does not parse
/// as a name-to-months map is an error.
pub fn load_machine_calendar(path: &Path) -> Result<SeasonalCalendar> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            warn!(
                "Machine calendar not found at {}; adjustment disabled",
                path.display()
            );
            return Ok(SeasonalCalendar::new());
        }
        Err(source) => {
            return Err(RentalError::FileRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let calendar: SeasonalCalendar = serde_json::from_str(&content)?;
    debug!(
        "Loaded calendar with {} entries from {}",
        calendar.len(),
        path.display()
    );
    Ok(calendar)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Forecast files are recognised by their file stem containing `forecast`.
fn is_forecast_file(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_ascii_lowercase().contains("forecast"))
        .unwrap_or(false)
}

/// Map normalised header names to column indices.
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(index, name)| (normalize_header_name(name), index))
        .collect()
}

/// Lowercase a header name, dropping a leading UTF-8 BOM and any
/// underscores, so `avgTemp`, `avgtemp` and `avg_temp` all resolve to the
/// same column.
fn normalize_header_name(name: &str) -> String {
    name.trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace('_', "")
}

/// Fetch a required column value, trimmed; empty counts as missing.
fn get_required<'a>(
    row: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> std::result::Result<&'a str, String> {
    get_optional(row, header_map, name).ok_or_else(|| format!("missing `{}` value", name))
}

/// Fetch an optional column value, trimmed; `None` when absent or empty.
fn get_optional<'a>(
    row: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let index = *header_map.get(name)?;
    let value = row.get(index)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parse a numeric measurement field, coercing anything unusable to 0.
fn parse_f64_or_zero(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse one CSV row into a [`RentalRecord`].
///
/// The identity columns (machine, year, month, period) must be present and
/// intelligible; the measurement columns degrade to 0 instead of failing
/// the row. An out-of-range month is kept as-is, the aggregation drops it.
fn parse_row(
    row: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> std::result::Result<RentalRecord, String> {
    let machine = get_required(row, header_map, "machine")?.to_string();
    let year = get_required(row, header_map, "year")?
        .parse::<i32>()
        .map_err(|_| "unparsable `year` value".to_string())?;
    let month = get_required(row, header_map, "month")?
        .parse::<u32>()
        .map_err(|_| "unparsable `month` value".to_string())?;
    let period_label = get_required(row, header_map, "period")?;
    let period = SubPeriod::from_label(period_label)
        .ok_or_else(|| format!("unknown sub-period token `{}`", period_label))?;

    let avg_temp = parse_f64_or_zero(get_optional(row, header_map, "avgtemp"));
    let rainfall = parse_f64_or_zero(get_optional(row, header_map, "rainfall"));
    let rental_count = parse_f64_or_zero(get_optional(row, header_map, "rentalcount"));
    let pred_rental_count = parse_f64_or_zero(get_optional(row, header_map, "predrentalcount"));

    Ok(RentalRecord {
        machine,
        year,
        month,
        period,
        avg_temp,
        rainfall,
        rental_count,
        pred_rental_count,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
