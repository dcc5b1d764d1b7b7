//! Single-key stable ordering of a record batch.

use crate::models::{Record, SortConfig};

/// Sort `records` by `config.key` in `config.direction`.
///
/// Returns a new vector; the input is untouched. The sort is stable in both
/// directions, so records that tie on the key keep their input order.
/// Records without a well-formed value for the key are left out.
pub fn sort(records: &[Record], config: SortConfig) -> Vec<Record> {
    let mut keyed: Vec<_> = records
        .iter()
        .filter_map(|record| config.key.value(record).map(|value| (value, record)))
        .collect();

    // `sort_by` is a stable merge sort.
    keyed.sort_by(|(a, _), (b, _)| config.direction.apply(a.compare(b)));

    keyed.into_iter().map(|(_, record)| record.clone()).collect()
}
