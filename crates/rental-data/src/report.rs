//! Report assembly for the rental pipeline.
//!
//! Orchestrates monthly aggregation and the optional calendar adjustment
//! over an already-loaded record set, returning a [`MonthlyReport`] ready
//! for the rendering layer.

use chrono::Utc;
use rental_core::aggregation::{AnnualTotals, MonthlyAggregator};
use rental_core::calendar::{AdjustmentOptions, CalendarAdjuster, SeasonalCalendar};
use rental_core::models::{CountField, MonthlyAggregate, RentalRecord};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside a monthly report.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReportMetadata {
    /// ISO-8601 timestamp when this report was generated.
    pub generated_at: String,
    /// Number of records in the input set.
    pub records_scanned: usize,
    /// Number of records matching the machine and year selection.
    pub records_matched: usize,
}

/// Options controlling how a [`MonthlyReport`] is assembled.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Which count column feeds the aggregation.
    pub count_field: CountField,
    /// Whether to apply the seasonal calendar to the aggregated counts.
    pub apply_calendar: bool,
    /// Boost/base factors and normalization policy for the adjustment.
    pub adjustment: AdjustmentOptions,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            count_field: CountField::Observed,
            apply_calendar: true,
            adjustment: AdjustmentOptions::default(),
        }
    }
}

/// A fully assembled monthly report for one machine and year.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MonthlyReport {
    /// Machine the report was built for.
    pub machine: String,
    /// Target year.
    pub year: i32,
    /// Count column that fed the aggregation.
    pub count_field: CountField,
    /// `true` when the calendar adjustment actually ran on this series.
    pub adjusted: bool,
    /// Calendar key the machine resolved to; set exactly when `adjusted`.
    pub calendar_key: Option<String>,
    /// Twelve monthly entries, January through December.
    pub series: Vec<MonthlyAggregate>,
    /// Totals over the reported series.
    pub totals: AnnualTotals,
    /// Metadata about this report run.
    pub metadata: ReportMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Assemble a monthly report for one machine and year.
///
/// 1. Aggregate `records` into 12 monthly entries.
/// 2. When requested and the machine resolves to a calendar entry with a
///    non-empty peak set, reweight the rental column.
/// 3. Total the final series and attach run metadata.
///
/// The calendar being empty, the machine not resolving, or the resolved
/// entry having no peaks all leave the series unadjusted; none is an error.
pub fn build_monthly_report(
    records: &[RentalRecord],
    machine: &str,
    year: i32,
    calendar: &SeasonalCalendar,
    options: &ReportOptions,
) -> MonthlyReport {
    // ── Step 1: Aggregate ─────────────────────────────────────────────────────
    let base_series =
        MonthlyAggregator::aggregate_monthly(records, year, machine, options.count_field);
    let records_matched = records
        .iter()
        .filter(|record| record.machine == machine && record.year == year)
        .count();

    // ── Step 2: Calendar adjustment ───────────────────────────────────────────
    let mut adjusted = false;
    let mut calendar_key: Option<String> = None;
    let series: Vec<MonthlyAggregate> = if options.apply_calendar {
        match calendar.resolve_key(machine) {
            Some(key) if !calendar.peak_months(key).unwrap_or(&[]).is_empty() => {
                calendar_key = Some(key.to_string());
                adjusted = true;
                CalendarAdjuster::adjust(&base_series, machine, calendar, &options.adjustment)
            }
            _ => base_series,
        }
    } else {
        base_series
    };

    // ── Step 3: Totals and metadata ───────────────────────────────────────────
    let totals = MonthlyAggregator::annual_totals(&series);

    let metadata = ReportMetadata {
        generated_at: Utc::now().to_rfc3339(),
        records_scanned: records.len(),
        records_matched,
    };

    MonthlyReport {
        machine: machine.to_string(),
        year,
        count_field: options.count_field,
        adjusted,
        calendar_key,
        series,
        totals,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rental_core::calendar::NormalizationPolicy;
    use rental_core::models::SubPeriod;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn make_record(machine: &str, year: i32, month: u32, rental: f64) -> RentalRecord {
        RentalRecord {
            machine: machine.to_string(),
            year,
            month,
            period: SubPeriod::Early,
            avg_temp: 15.0,
            rainfall: 10.0,
            rental_count: rental,
            pred_rental_count: rental * 2.0,
        }
    }

    fn no_adjust_options() -> ReportOptions {
        ReportOptions {
            apply_calendar: false,
            ..ReportOptions::default()
        }
    }

    // ── build_monthly_report ──────────────────────────────────────────────────

    #[test]
    fn test_build_report_aggregates_counts() {
        let records = vec![
            make_record("트랙터", 2024, 5, 10.0),
            make_record("트랙터", 2024, 5, 4.0),
            make_record("트랙터", 2024, 6, 20.0),
        ];
        let calendar = SeasonalCalendar::new();

        let report =
            build_monthly_report(&records, "트랙터", 2024, &calendar, &no_adjust_options());

        assert_eq!(report.machine, "트랙터");
        assert_eq!(report.year, 2024);
        assert_eq!(report.series.len(), 12);
        assert!((report.series[4].rental - 14.0).abs() < 1e-9);
        assert!((report.series[5].rental - 20.0).abs() < 1e-9);
        assert!(!report.adjusted);
        assert!(report.calendar_key.is_none());
        assert!((report.totals.rental - 34.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_report_applies_calendar() {
        let records = vec![
            make_record("트랙터", 2024, 5, 10.0),
            make_record("트랙터", 2024, 6, 20.0),
        ];
        let calendar = SeasonalCalendar::from_entries([("트랙터", vec![5])]);
        let options = ReportOptions {
            adjustment: AdjustmentOptions {
                boost_factor: 2.0,
                base_factor: 0.5,
                normalization: NormalizationPolicy::Off,
            },
            ..ReportOptions::default()
        };

        let report = build_monthly_report(&records, "트랙터", 2024, &calendar, &options);

        assert!(report.adjusted);
        assert_eq!(report.calendar_key.as_deref(), Some("트랙터"));
        assert!((report.series[4].rental - 20.0).abs() < 1e-9);
        assert!((report.series[5].rental - 10.0).abs() < 1e-9);
        assert!((report.totals.rental - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_report_annual_total_preserved() {
        let records = vec![
            make_record("트랙터", 2024, 5, 10.0),
            make_record("트랙터", 2024, 6, 20.0),
            make_record("트랙터", 2024, 7, 30.0),
        ];
        let calendar = SeasonalCalendar::from_entries([("트랙터", vec![5])]);
        let options = ReportOptions::default();

        let report = build_monthly_report(&records, "트랙터", 2024, &calendar, &options);

        assert!(report.adjusted);
        // The default policy rescales so the year total survives adjustment.
        assert!((report.totals.rental - 60.0).abs() < 1e-9);
        assert!((report.series[4].rental - 10.0).abs() > 1e-3);
    }

    #[test]
    fn test_build_report_unresolved_machine_not_adjusted() {
        let records = vec![make_record("트랙터", 2024, 5, 10.0)];
        let calendar = SeasonalCalendar::from_entries([("이앙기", vec![5, 6])]);

        let report =
            build_monthly_report(&records, "트랙터", 2024, &calendar, &ReportOptions::default());

        assert!(!report.adjusted);
        assert!(report.calendar_key.is_none());
        assert!((report.series[4].rental - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_report_empty_peaks_not_adjusted() {
        let records = vec![make_record("트랙터", 2024, 5, 10.0)];
        let calendar = SeasonalCalendar::from_entries([("트랙터", Vec::new())]);

        let report =
            build_monthly_report(&records, "트랙터", 2024, &calendar, &ReportOptions::default());

        assert!(!report.adjusted);
        assert!(report.calendar_key.is_none());
        assert!((report.series[4].rental - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_report_apply_calendar_false_ignores_calendar() {
        let records = vec![make_record("트랙터", 2024, 5, 10.0)];
        let calendar = SeasonalCalendar::from_entries([("트랙터", vec![5])]);

        let report =
            build_monthly_report(&records, "트랙터", 2024, &calendar, &no_adjust_options());

        assert!(!report.adjusted);
        assert!((report.series[4].rental - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_report_predicted_count_field() {
        let records = vec![make_record("트랙터", 2026, 5, 7.0)];
        let calendar = SeasonalCalendar::new();
        let options = ReportOptions {
            count_field: CountField::Predicted,
            apply_calendar: false,
            ..ReportOptions::default()
        };

        let report = build_monthly_report(&records, "트랙터", 2026, &calendar, &options);

        assert_eq!(report.count_field, CountField::Predicted);
        // make_record stores double the observed value in the predicted column.
        assert!((report.series[4].rental - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_report_metadata_counts() {
        let records = vec![
            make_record("트랙터", 2024, 5, 10.0),
            make_record("트랙터", 2023, 5, 10.0),
            make_record("이앙기", 2024, 5, 10.0),
        ];
        let calendar = SeasonalCalendar::new();

        let report =
            build_monthly_report(&records, "트랙터", 2024, &calendar, &no_adjust_options());

        assert_eq!(report.metadata.records_scanned, 3);
        assert_eq!(report.metadata.records_matched, 1);
        assert!(!report.metadata.generated_at.is_empty());
    }

    #[test]
    fn test_build_report_empty_records() {
        let calendar = SeasonalCalendar::new();
        let report = build_monthly_report(&[], "트랙터", 2024, &calendar, &no_adjust_options());

        assert_eq!(report.series.len(), 12);
        assert!(report.series.iter().all(|entry| entry.rental == 0.0));
        assert_eq!(report.metadata.records_matched, 0);
        assert_eq!(report.totals.rental, 0.0);
    }

    #[test]
    fn test_build_report_serializes_to_json() {
        let records = vec![make_record("트랙터", 2024, 5, 10.0)];
        let calendar = SeasonalCalendar::new();

        let report =
            build_monthly_report(&records, "트랙터", 2024, &calendar, &no_adjust_options());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["machine"], "트랙터");
        assert_eq!(json["count_field"], "observed");
        assert_eq!(json["series"].as_array().unwrap().len(), 12);
    }
}
