//! Table state machine: sort/filter/page state plus the derived window.
//!
//! Every data intent re-runs the whole pipeline (sort, filter, clamp page,
//! paginate) synchronously. At the batch sizes the markets endpoint serves
//! (a few hundred rows) this is cheaper than keeping incremental state in
//! sync; very large batches would make it the first thing to revisit.

use serde::Serialize;

use crate::config::TableConfig;
use crate::engine;
use crate::error::Result;
use crate::models::{
    validate_batch, FilterState, FilterUpdate, MalformedRecord, PaginationState, Record,
    SortConfig, SortKey,
};
use crate::view::{self, Projection, ViewMode};

// ---------------------------------------------------------------------------
// TableSnapshot
// ---------------------------------------------------------------------------

/// Read-only view of the controller after the last recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub visible_rows: Vec<Record>,
    pub sort: SortConfig,
    pub filters: FilterState,
    pub current_page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
    pub batch_len: usize,
    pub view_mode: ViewMode,
    pub loading: bool,
    pub fetch_error: Option<String>,
    pub malformed: Vec<MalformedRecord>,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Output of the pipeline. Written only by [`TableController::recompute`].
#[derive(Debug, Default)]
struct Window {
    rows: Vec<Record>,
    filtered_count: usize,
    total_pages: usize,
    malformed: Vec<MalformedRecord>,
}

// ---------------------------------------------------------------------------
// TableController
// ---------------------------------------------------------------------------

pub struct TableController {
    config: TableConfig,
    batch: Vec<Record>,
    sort: SortConfig,
    filters: FilterState,
    current_page: usize,
    view_mode: ViewMode,
    /// Fetches started and not yet completed.
    pending_fetches: usize,
    fetch_error: Option<String>,
    window: Window,
}

impl TableController {
    /// Create a controller with an empty batch and default state.
    pub fn new(config: TableConfig) -> Self {
        Self {
            sort: config.default_sort,
            filters: FilterState::default(),
            current_page: 1,
            view_mode: view::select_view(config.initial_width, config.breakpoint),
            pending_fetches: 0,
            fetch_error: None,
            batch: Vec::new(),
            window: Window::default(),
            config,
        }
    }

    // -- Intents ------------------------------------------------------------

    /// Sort by `key`. Re-selecting the active key flips the direction; a new
    /// key starts ascending. Always returns to page 1.
    pub fn set_sort(&mut self, key: SortKey) {
        let next = if self.sort.key == key {
            SortConfig::new(key, self.sort.direction.toggled())
        } else {
            SortConfig::ascending(key)
        };
        self.set_sort_config(next);
    }

    /// Replace the sort config outright. Always returns to page 1.
    pub fn set_sort_config(&mut self, config: SortConfig) {
        log::debug!("sort -> {} {:?}", config.key, config.direction);
        self.sort = config;
        self.current_page = 1;
        self.recompute();
    }

    /// Merge `update` into the filters and return to page 1.
    ///
    /// An invalid `min_price` is rejected and nothing changes.
    pub fn set_filter(&mut self, update: FilterUpdate) -> Result<()> {
        self.filters.merge(update)?;
        self.current_page = 1;
        self.recompute();
        Ok(())
    }

    /// Jump to page `n`, clamped to `[1, max(total_pages, 1)]`.
    pub fn go_to_page(&mut self, n: usize) {
        self.current_page = n;
        self.recompute();
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.current_page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.current_page.saturating_sub(1));
    }

    /// Swap in a freshly fetched batch, keeping sort and filters.
    ///
    /// A batch with duplicate ids is rejected and the current batch stays.
    pub fn on_batch_replaced(&mut self, records: Vec<Record>) -> Result<()> {
        validate_batch(&records)?;
        log::debug!("batch replaced: {} records", records.len());
        self.batch = records;
        self.pending_fetches = self.pending_fetches.saturating_sub(1);
        self.fetch_error = None;
        self.current_page = 1;
        self.recompute();
        Ok(())
    }

    /// Count a fetch as in flight. Overlapping fetches stack.
    pub fn on_fetch_started(&mut self) {
        self.pending_fetches += 1;
    }

    /// Record a failed fetch. The batch and window are left as they were.
    pub fn on_fetch_failed(&mut self, message: impl Into<String>) {
        self.pending_fetches = self.pending_fetches.saturating_sub(1);
        self.fetch_error = Some(message.into());
    }

    /// Report the presentation width. Only the view mode changes.
    pub fn set_viewport_width(&mut self, width: f32) {
        self.view_mode = view::select_view(width, self.config.breakpoint);
    }

    // -- Derived state ------------------------------------------------------

    fn recompute(&mut self) {
        let sorted = engine::sort(&self.batch, self.sort);
        let filtered = engine::filter(&sorted, &self.filters);
        let total_pages = engine::total_pages(filtered.len(), self.config.page_size);

        self.current_page = self.current_page.clamp(1, total_pages.max(1));
        let rows = engine::paginate(
            &filtered,
            PaginationState::new(self.current_page, self.config.page_size),
        );

        let malformed = engine::find_malformed(&self.batch, self.sort, &self.filters);
        if !malformed.is_empty() && malformed != self.window.malformed {
            log::warn!(
                "{} record(s) excluded for missing fields: {}",
                malformed.len(),
                malformed
                    .iter()
                    .map(|m| format!("{}.{}", m.id, m.field))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        self.window = Window {
            rows,
            filtered_count: filtered.len(),
            total_pages,
            malformed,
        };
    }

    // -- Accessors ----------------------------------------------------------

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            visible_rows: self.window.rows.clone(),
            sort: self.sort,
            filters: self.filters.clone(),
            current_page: self.current_page,
            total_pages: self.window.total_pages,
            filtered_count: self.window.filtered_count,
            batch_len: self.batch.len(),
            view_mode: self.view_mode,
            loading: self.is_loading(),
            fetch_error: self.fetch_error.clone(),
            malformed: self.window.malformed.clone(),
            has_prev: self.current_page > 1,
            has_next: self.current_page < self.window.total_pages,
        }
    }

    /// Display projection of the visible window in the current view mode.
    pub fn projection(&self) -> Projection {
        view::project(&self.window.rows, self.view_mode)
    }

    pub fn visible_rows(&self) -> &[Record] {
        &self.window.rows
    }

    pub fn batch(&self) -> &[Record] {
        &self.batch
    }

    pub fn sort_config(&self) -> SortConfig {
        self.sort
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.window.total_pages
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    /// Whether any fetch is still in flight.
    pub fn is_loading(&self) -> bool {
        self.pending_fetches > 0
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }
}

impl Default for TableController {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}
