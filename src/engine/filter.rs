//! AND-composed row predicates.

use crate::models::{FilterState, Record};

/// Keep the records of `records` that satisfy every predicate in `state`.
///
/// Input order is preserved, so running this after [`sort`](super::sort)
/// keeps the chosen ordering.
pub fn filter(records: &[Record], state: &FilterState) -> Vec<Record> {
    let needle = state.query.trim().to_lowercase();
    records
        .iter()
        .filter(|record| matches(record, state, &needle))
        .cloned()
        .collect()
}

/// Evaluate all predicates for one record. `needle` is the lowercased query.
fn matches(record: &Record, state: &FilterState, needle: &str) -> bool {
    let meets_price = record.price().is_some_and(|p| p >= state.min_price);
    let meets_change =
        !state.positive_change_only || record.change_24h().is_some_and(|c| c > 0.0);
    let meets_query = needle.is_empty()
        || [record.name(), record.symbol()]
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().contains(needle));

    meets_price && meets_change && meets_query
}
