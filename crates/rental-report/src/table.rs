//! Plain-text rendering of a monthly report.
//!
//! One row per month plus a totals row, with a share column relating each
//! month's rentals to the year total. Kept as a pure string builder so the
//! output is testable and pipeable.

use rental_core::formatting;
use rental_data::report::MonthlyReport;

/// Render `report` as an aligned text table with a totals row.
pub fn render_report(report: &MonthlyReport) -> String {
    let mut out = String::new();

    let adjusted_note = if report.adjusted {
        " (calendar-adjusted)"
    } else {
        ""
    };
    out.push_str(&format!(
        "Machine: {}  Year: {}  Counts: {}{}\n\n",
        report.machine,
        report.year,
        report.count_field.name(),
        adjusted_note
    ));

    out.push_str(&format!(
        "{:<6} {:>10} {:>8} {:>10} {:>10}\n",
        "Month", "Rentals", "Share", "Rainfall", "Avg Temp"
    ));

    for entry in &report.series {
        let share = formatting::percentage(entry.rental, report.totals.rental, 1);
        out.push_str(&format!(
            "{:<6} {:>10} {:>7}% {:>10} {:>10}\n",
            formatting::month_name(entry.month),
            formatting::format_number(entry.rental, 1),
            formatting::format_number(share, 1),
            formatting::format_number(entry.rainfall, 1),
            formatting::format_number(entry.avg_temp, 1),
        ));
    }

    let total_share = formatting::percentage(report.totals.rental, report.totals.rental, 1);
    out.push_str(&format!(
        "{:<6} {:>10} {:>7}% {:>10} {:>10}\n",
        "TOTAL",
        formatting::format_number(report.totals.rental, 1),
        formatting::format_number(total_share, 1),
        formatting::format_number(report.totals.rainfall, 1),
        "-",
    ));

    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rental_core::aggregation::AnnualTotals;
    use rental_core::models::{CountField, MonthlyAggregate};
    use rental_data::report::ReportMetadata;

    fn make_report() -> MonthlyReport {
        let mut series: Vec<MonthlyAggregate> = (1..=12).map(MonthlyAggregate::empty).collect();
        series[4].rental = 30.0;
        series[4].rainfall = 120.5;
        series[4].avg_temp = 17.8;
        series[5].rental = 10.0;
        series[5].rainfall = 80.0;
        series[5].avg_temp = 22.3;

        MonthlyReport {
            machine: "트랙터".to_string(),
            year: 2024,
            count_field: CountField::Observed,
            adjusted: false,
            calendar_key: None,
            series,
            totals: AnnualTotals {
                rental: 40.0,
                rainfall: 200.5,
            },
            metadata: ReportMetadata {
                generated_at: "2024-01-01T00:00:00+00:00".to_string(),
                records_scanned: 4,
                records_matched: 2,
            },
        }
    }

    #[test]
    fn test_render_report_has_header_and_all_months() {
        let output = render_report(&make_report());

        assert!(output.contains("Machine: 트랙터"));
        assert!(output.contains("Year: 2024"));
        assert!(output.contains("Counts: observed"));
        assert!(output.contains("Month"));
        for name in ["Jan", "Feb", "May", "Jun", "Dec"] {
            assert!(output.contains(name), "missing month {}", name);
        }
        assert!(output.contains("TOTAL"));
    }

    #[test]
    fn test_render_report_formats_values_and_shares() {
        let output = render_report(&make_report());

        // May: 30 of 40 rentals.
        assert!(output.contains("30.0"));
        assert!(output.contains("75.0%"));
        // June: 10 of 40 rentals.
        assert!(output.contains("25.0%"));
        assert!(output.contains("120.5"));
        assert!(output.contains("100.0%"));
    }

    #[test]
    fn test_render_report_adjusted_note() {
        let mut report = make_report();
        assert!(!render_report(&report).contains("calendar-adjusted"));

        report.adjusted = true;
        report.calendar_key = Some("트랙터".to_string());
        assert!(render_report(&report).contains("(calendar-adjusted)"));
    }

    #[test]
    fn test_render_report_zero_totals_have_no_nan() {
        let series: Vec<MonthlyAggregate> = (1..=12).map(MonthlyAggregate::empty).collect();
        let report = MonthlyReport {
            machine: "이앙기".to_string(),
            year: 2025,
            count_field: CountField::Predicted,
            adjusted: false,
            calendar_key: None,
            series,
            totals: AnnualTotals::default(),
            metadata: ReportMetadata {
                generated_at: "2025-01-01T00:00:00+00:00".to_string(),
                records_scanned: 0,
                records_matched: 0,
            },
        };

        let output = render_report(&report);
        assert!(!output.contains("NaN"));
        assert!(output.contains("0.0%"));
        assert!(output.contains("Counts: predicted"));
    }

    #[test]
    fn test_render_report_line_count() {
        // Header line, blank line, column header, 12 months, TOTAL.
        let output = render_report(&make_report());
        assert_eq!(output.lines().count(), 16);
    }
}
