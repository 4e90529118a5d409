use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Selects which count column of a record aggregation reads.
///
/// Actual (training) files carry an observed rental count, forecast files a
/// predicted one. The caller resolves which field applies; it is never
/// inferred at runtime from the shape of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountField {
    /// Read the observed rental count.
    Observed,
    /// Read the precomputed forecast rental count.
    Predicted,
}

impl CountField {
    /// Lowercase name, matching the serde representation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Observed => "observed",
            Self::Predicted => "predicted",
        }
    }
}

/// One of the three fixed sub-month segments used by the source data.
///
/// The serde names are the exact tokens that appear in the record files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubPeriod {
    /// Days 1 through 10.
    #[serde(rename = "1~10일")]
    Early,
    /// Days 11 through 20.
    #[serde(rename = "11~20일")]
    Mid,
    /// Day 21 through the last day of the month.
    #[serde(rename = "21~말일")]
    Late,
}

impl SubPeriod {
    /// Parses a raw sub-period token from a record file.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "1~10일" => Some(Self::Early),
            "11~20일" => Some(Self::Mid),
            "21~말일" => Some(Self::Late),
            _ => None,
        }
    }

    /// The source-data token for this sub-period.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Early => "1~10일",
            Self::Mid => "11~20일",
            Self::Late => "21~말일",
        }
    }

    /// Number of days this sub-period covers in the given month.
    ///
    /// `Early` and `Mid` are always 10 days; `Late` runs from day 21 to the
    /// end of the month, so its span depends on the real calendar (leap
    /// years included). Returns `None` for months outside 1-12.
    ///
    /// # Examples
    ///
    /// ```
    /// use rental_core::models::SubPeriod;
    ///
    /// assert_eq!(SubPeriod::Early.day_span(2024, 2), Some(10));
    /// assert_eq!(SubPeriod::Late.day_span(2024, 2), Some(9)); // leap February
    /// assert_eq!(SubPeriod::Late.day_span(2023, 2), Some(8));
    /// assert_eq!(SubPeriod::Late.day_span(2024, 13), None);
    /// ```
    pub fn day_span(&self, year: i32, month: u32) -> Option<u32> {
        match self {
            Self::Early | Self::Mid => days_in_month(year, month).map(|_| 10),
            Self::Late => days_in_month(year, month).map(|days| days - 20),
        }
    }
}

/// Number of days in the given calendar month, leap years accounted for.
///
/// Returns `None` for months outside 1-12.
///
/// # Examples
///
/// ```
/// use rental_core::models::days_in_month;
///
/// assert_eq!(days_in_month(2024, 2), Some(29));
/// assert_eq!(days_in_month(2023, 2), Some(28));
/// assert_eq!(days_in_month(1900, 2), Some(28)); // century, not a leap year
/// assert_eq!(days_in_month(2024, 0), None);
/// ```
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// A single sub-monthly observation row read from a record file.
///
/// Numeric fields are plain `f64`; missing or malformed values are coerced
/// to 0 once, at ingestion, so the transforms never see anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalRecord {
    /// Machine (equipment type) identifier, e.g. `트랙터` or `Tractor`.
    pub machine: String,
    /// Calendar year of the observation.
    pub year: i32,
    /// Month 1-12. Out-of-range values survive ingestion but can never be
    /// placed into a monthly slot, so aggregation drops them.
    pub month: u32,
    /// Which third of the month this row covers.
    pub period: SubPeriod,
    /// Mean temperature over the sub-period, assumed constant across its days.
    #[serde(default)]
    pub avg_temp: f64,
    /// Precipitation accumulated over the sub-period.
    #[serde(default)]
    pub rainfall: f64,
    /// Observed rental count (actual files; 0 in forecast files).
    #[serde(default)]
    pub rental_count: f64,
    /// Predicted rental count (forecast files; 0 in actual files).
    #[serde(default)]
    pub pred_rental_count: f64,
}

impl RentalRecord {
    /// The count value selected by `field`.
    pub fn count(&self, field: CountField) -> f64 {
        match field {
            CountField::Observed => self.rental_count,
            CountField::Predicted => self.pred_rental_count,
        }
    }

    /// Length in days of this record's sub-period, `None` when the month is
    /// out of range.
    pub fn day_span(&self) -> Option<u32> {
        self.period.day_span(self.year, self.month)
    }
}

/// Aggregated values for a single month of one machine/year selection.
///
/// A full series is always exactly 12 of these, months 1 through 12 in
/// order, zero-filled where no records exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    /// Month 1-12.
    pub month: u32,
    /// Sum of the selected count field across the month's sub-periods.
    /// The only field the calendar adjustment rewrites.
    pub rental: f64,
    /// Sum of precipitation across the month's sub-periods.
    pub rainfall: f64,
    /// Sub-period-length-weighted mean temperature; 0 for empty months.
    pub avg_temp: f64,
}

impl MonthlyAggregate {
    /// An empty (zero-filled) aggregate for the given month.
    pub fn empty(month: u32) -> Self {
        Self {
            month,
            rental: 0.0,
            rainfall: 0.0,
            avg_temp: 0.0,
        }
    }
}
