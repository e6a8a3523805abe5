// src/extractors/dedup.rs
use std::collections::HashSet;

use crate::extractors::records::PageRecord;

/// Drop records whose `(date, contributor_name, amount)` was already seen.
///
/// The first occurrence wins and the survivors keep their relative order.
/// Records that differ only in address, occupation or employer count as the
/// same entry.
pub fn dedupe_records(records: Vec<PageRecord>) -> Vec<PageRecord> {
    let before = records.len();
    let mut seen = HashSet::with_capacity(records.len());
    let kept: Vec<PageRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.record.key()))
        .collect();

    if kept.len() < before {
        tracing::debug!("Removed {} duplicate record(s)", before - kept.len());
    }
    kept
}
