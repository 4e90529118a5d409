//! Seasonal calendar adjustment of monthly rental series.
//!
//! A seasonal calendar maps machine names to their peak-usage months. The
//! adjuster reweights the rental column of a 12-month series toward those
//! months, optionally compensating so the year total stays where it was.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::MonthlyAggregate;

/// Multiplier applied to peak months when none is configured.
pub const DEFAULT_BOOST: f64 = 1.2;
/// Multiplier applied to non-peak months when none is configured.
pub const DEFAULT_BASE: f64 = 0.9;

// ── SeasonalCalendar ──────────────────────────────────────────────────────────

/// Static reference table mapping machine names to peak months (1-12).
///
/// Loaded once by the data layer and shared read-only across computations.
/// Backed by a `BTreeMap` so the fuzzy resolution tier walks keys in a
/// deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonalCalendar(BTreeMap<String, Vec<u32>>);

impl SeasonalCalendar {
    /// An empty calendar. Adjusting against it is always a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a calendar from `(machine, peak months)` pairs.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<u32>)>,
        K: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(|(key, months)| (key.into(), months))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Peak months registered under the exact key, if any.
    pub fn peak_months(&self, key: &str) -> Option<&[u32]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// Resolve a machine name to the calendar key that covers it.
    ///
    /// Two tiers, both case-sensitive:
    ///
    /// 1. An exact key match wins.
    /// 2. Otherwise both sides are normalized by stripping whitespace,
    ///    parentheses, hyphens and underscores, and the first key (in sorted
    ///    key order) whose normalized form is a substring of the normalized
    ///    machine name is taken. This covers decorated names such as
    ///    `"Tractor (Model-A)"` against a plain `"Tractor"` entry.
    ///
    /// Returns `None` when nothing matches; the caller treats that as
    /// "no adjustment applies".
    pub fn resolve_key(&self, machine: &str) -> Option<&str> {
        if let Some((key, _)) = self.0.get_key_value(machine) {
            return Some(key.as_str());
        }

        let strip = Regex::new(r"[\s()\-_]").expect("regex is valid");
        let normalized_machine = strip.replace_all(machine, "");
        self.0
            .keys()
            .find(|key| {
                let normalized_key = strip.replace_all(key, "");
                normalized_machine.contains(normalized_key.as_ref())
            })
            .map(String::as_str)
    }
}

// ── Adjustment options ────────────────────────────────────────────────────────

/// How the adjusted series compensates for the raw weighting.
///
/// Both compensating policies aim at keeping the year total near the
/// original, but they are not numerically identical when the raw monthly
/// counts are uneven, so the choice stays explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizationPolicy {
    /// Rescale the adjusted counts afterwards by `pre_sum / post_sum` so the
    /// annual total is numerically unchanged. Skipped when either sum is 0.
    AnnualTotal,
    /// Scale the weights beforehand so their mean is exactly 1.
    WeightMean,
    /// Apply the raw weights with no compensation.
    Off,
}

impl NormalizationPolicy {
    /// Parse the kebab-case policy name used on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "annual-total" => Some(Self::AnnualTotal),
            "weight-mean" => Some(Self::WeightMean),
            "off" => Some(Self::Off),
            _ => None,
        }
    }

    /// The kebab-case policy name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AnnualTotal => "annual-total",
            Self::WeightMean => "weight-mean",
            Self::Off => "off",
        }
    }
}

/// Parameters controlling a calendar adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentOptions {
    /// Multiplier for months in the peak set.
    pub boost_factor: f64,
    /// Multiplier for every other month.
    pub base_factor: f64,
    /// Compensation policy for the year total.
    pub normalization: NormalizationPolicy,
}

impl Default for AdjustmentOptions {
    fn default() -> Self {
        Self {
            boost_factor: DEFAULT_BOOST,
            base_factor: DEFAULT_BASE,
            normalization: NormalizationPolicy::AnnualTotal,
        }
    }
}

// ── CalendarAdjuster ──────────────────────────────────────────────────────────

/// Stateless helper that reweights the rental column of a monthly series.
pub struct CalendarAdjuster;

impl CalendarAdjuster {
    /// Apply seasonal weights to the rental counts of `series`.
    ///
    /// The machine name is resolved against the calendar via
    /// [`SeasonalCalendar::resolve_key`]. When no key resolves, or the
    /// resolved key has an empty peak set, the series comes back unchanged;
    /// neither case is an error. Rainfall and temperature always pass
    /// through untouched, and the input itself is never mutated.
    pub fn adjust(
        series: &[MonthlyAggregate],
        machine: &str,
        calendar: &SeasonalCalendar,
        options: &AdjustmentOptions,
    ) -> Vec<MonthlyAggregate> {
        if series.is_empty() {
            return Vec::new();
        }

        let peaks = match calendar.resolve_key(machine) {
            Some(key) => calendar.peak_months(key).unwrap_or(&[]),
            None => return series.to_vec(),
        };
        if peaks.is_empty() {
            return series.to_vec();
        }

        let mut weights: Vec<f64> = series
            .iter()
            .map(|entry| {
                if peaks.contains(&entry.month) {
                    options.boost_factor
                } else {
                    options.base_factor
                }
            })
            .collect();

        if options.normalization == NormalizationPolicy::WeightMean {
            let mean = weights.iter().sum::<f64>() / weights.len() as f64;
            let factor = if mean == 0.0 { 1.0 } else { 1.0 / mean };
            for weight in &mut weights {
                *weight *= factor;
            }
        }

        let mut adjusted: Vec<MonthlyAggregate> = series
            .iter()
            .zip(&weights)
            .map(|(entry, weight)| {
                let mut out = entry.clone();
                out.rental = entry.rental * weight;
                out
            })
            .collect();

        if options.normalization == NormalizationPolicy::AnnualTotal {
            let pre_sum: f64 = series.iter().map(|entry| entry.rental).sum();
            let post_sum: f64 = adjusted.iter().map(|entry| entry.rental).sum();
            // A zero post sum means every weighted count vanished; rescaling
            // would divide by zero, so the raw weighted values stand.
            if pre_sum > 0.0 && post_sum > 0.0 {
                let scale = pre_sum / post_sum;
                for entry in &mut adjusted {
                    entry.rental *= scale;
                }
            }
        }

        adjusted
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
