//! Monthly aggregation of sub-monthly rental records.
//!
//! Reduces the irregular per-third observation rows for one machine and year
//! into a fixed series of 12 monthly aggregates.

use crate::models::{CountField, MonthlyAggregate, RentalRecord};

// ── MonthAccumulator ──────────────────────────────────────────────────────────

/// Running sums for a single month slot while records stream in.
#[derive(Debug, Clone, Copy, Default)]
struct MonthAccumulator {
    rental: f64,
    rainfall: f64,
    temp_weighted: f64,
    weight: f64,
}

impl MonthAccumulator {
    fn add_record(&mut self, record: &RentalRecord, span: f64, count_field: CountField) {
        self.rental += record.count(count_field);
        self.rainfall += record.rainfall;
        self.temp_weighted += record.avg_temp * span;
        self.weight += span;
    }

    fn finish(self, month: u32) -> MonthlyAggregate {
        MonthlyAggregate {
            month,
            rental: self.rental,
            rainfall: self.rainfall,
            avg_temp: if self.weight > 0.0 {
                self.temp_weighted / self.weight
            } else {
                0.0
            },
        }
    }
}

// ── AnnualTotals ──────────────────────────────────────────────────────────────

/// Year totals of the summable columns of a 12-month series.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnnualTotals {
    pub rental: f64,
    pub rainfall: f64,
}

// ── MonthlyAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that reduces rental records to monthly series.
pub struct MonthlyAggregator;

impl MonthlyAggregator {
    /// Aggregate `records` for one machine and year into exactly 12 monthly
    /// entries, months 1 through 12 in order.
    ///
    /// Per month: the selected count field and the rainfall are summed, the
    /// temperature is averaged weighted by sub-period length in days. Months
    /// with no matching rows come back zero-filled; a month whose weight sum
    /// is 0 gets a 0 temperature rather than a division by zero. Rows whose
    /// month falls outside 1-12 are dropped, as they cannot be placed into
    /// an output slot. Duplicate rows for the same (month, sub-period) all
    /// accumulate.
    ///
    /// Pure and deterministic. Never fails: an empty or non-matching input
    /// yields an all-zero series.
    pub fn aggregate_monthly(
        records: &[RentalRecord],
        target_year: i32,
        machine: &str,
        count_field: CountField,
    ) -> Vec<MonthlyAggregate> {
        let mut slots = [MonthAccumulator::default(); 12];

        for record in records {
            if record.year != target_year || record.machine != machine {
                continue;
            }
            // `day_span` is None exactly when the month is out of range.
            let span = match record.day_span() {
                Some(days) => f64::from(days),
                None => continue,
            };
            slots[(record.month - 1) as usize].add_record(record, span, count_field);
        }

        slots
            .iter()
            .enumerate()
            .map(|(index, acc)| acc.finish(index as u32 + 1))
            .collect()
    }

    /// Sum the summable columns of a monthly series.
    pub fn annual_totals(series: &[MonthlyAggregate]) -> AnnualTotals {
        let mut totals = AnnualTotals::default();
        for entry in series {
            totals.rental += entry.rental;
            totals.rainfall += entry.rainfall;
        }
        totals
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
