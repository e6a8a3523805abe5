// src/extractors/aggregate.rs
use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::extractors::records::{ContributionRecord, PageRecord};

/// Order records by date, then by source page, and drop the page tag.
///
/// Dates that do not parse as calendar dates sort after every valid date.
/// The sort is stable, so records on the same page keep their scan order.
pub fn finalize_records(records: Vec<PageRecord>) -> Vec<ContributionRecord> {
    let mut keyed: Vec<(Option<NaiveDate>, PageRecord)> = records
        .into_iter()
        .map(|r| (r.record.parsed_date(), r))
        .collect();

    let unparseable = keyed.iter().filter(|(date, _)| date.is_none()).count();
    if unparseable > 0 {
        tracing::warn!("{} record(s) have an unparseable date and are listed last", unparseable);
    }

    keyed.sort_by(|(a_date, a), (b_date, b)| {
        compare_dates(a_date, b_date).then(a.source_page.cmp(&b.source_page))
    });

    keyed.into_iter().map(|(_, r)| r.record).collect()
}

fn compare_dates(a: &Option<NaiveDate>, b: &Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
