//! Reporting of records that the active sort or filters cannot evaluate.

use crate::models::{FilterState, MalformedRecord, Record, SortConfig, SortKey};

/// List the records that lack a field required by `sort` or `filters`.
///
/// Each record is reported at most once, under the first missing field in
/// the order sort key, price, 24h change. Output follows batch order.
pub fn find_malformed(
    records: &[Record],
    sort: SortConfig,
    filters: &FilterState,
) -> Vec<MalformedRecord> {
    records
        .iter()
        .filter_map(|record| missing_field(record, sort, filters))
        .collect()
}

fn missing_field(
    record: &Record,
    sort: SortConfig,
    filters: &FilterState,
) -> Option<MalformedRecord> {
    let field = if sort.key.value(record).is_none() {
        sort.key.field_name()
    } else if record.price().is_none() {
        SortKey::CurrentPrice.field_name()
    } else if filters.positive_change_only && record.change_24h().is_none() {
        SortKey::PriceChangePercent24h.field_name()
    } else {
        return None;
    };

    Some(MalformedRecord {
        id: record.id.clone(),
        field: field.to_string(),
    })
}
