//! Fixed-size page windows over an already sorted and filtered sequence.

use std::num::NonZeroUsize;

use crate::models::{PaginationState, Record};

/// Number of pages needed for `len` rows; `0` when there are no rows.
pub fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get())
}

/// Return the rows of page `state.current_page`.
///
/// The page is not clamped here. Page `0` or a page past the end yields an
/// empty vector.
pub fn paginate(records: &[Record], state: PaginationState) -> Vec<Record> {
    let Some(index) = state.current_page.checked_sub(1) else {
        return Vec::new();
    };
    let size = state.page_size.get();
    let start = index.saturating_mul(size);
    if start >= records.len() {
        return Vec::new();
    }
    let end = start.saturating_add(size).min(records.len());
    records[start..end].to_vec()
}
