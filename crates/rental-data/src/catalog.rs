//! Selection catalogs over loaded record sets.
//!
//! The CLI builds its machine and year choices from these rather than
//! hard-coding them, so the data directory alone decides what can be
//! reported on.

use std::collections::BTreeSet;

use rental_core::models::RentalRecord;

/// Distinct machine names in `records`, sorted ascending.
pub fn list_machines(records: &[RentalRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| record.machine.clone())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Distinct years in `records`, sorted ascending.
pub fn list_years(records: &[RentalRecord]) -> Vec<i32> {
    records
        .iter()
        .map(|record| record.year)
        .collect::<BTreeSet<i32>>()
        .into_iter()
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
