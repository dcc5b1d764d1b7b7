//! Market quote table engine for Rust.
//!
//! Fetches a batch of cryptocurrency quotes from the CoinGecko markets API
//! and turns it into the exact page of rows to render, given one sort key,
//! a set of filters and a page cursor. The same page is projected either as
//! table rows or as cards depending on the viewport width.
//!
//! # Quick start
//!
//! ```no_run
//! use market_table::{FilterUpdate, MarketTable, SortKey};
//!
//! let mut table = MarketTable::builder().page_size(10).build().unwrap();
//! table.refresh().unwrap();
//!
//! table.set_sort(SortKey::CurrentPrice);
//! table.set_filter(FilterUpdate::default().min_price(1.0)).unwrap();
//! table.go_to_page(2);
//!
//! let snapshot = table.snapshot();
//! println!("page {} of {}", snapshot.current_page, snapshot.total_pages);
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod cache;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod models;
pub mod source;
pub mod view;

#[cfg(feature = "async")]
pub use async_client::AsyncMarketTable;
pub use cache::BatchCache;
pub use config::{Config, FetchConfig, TableConfig};
pub use controller::{TableController, TableSnapshot};
pub use error::{MarketTableError, Result};
pub use models::{
    FilterState, FilterUpdate, MalformedRecord, PaginationState, Record, SortConfig,
    SortDirection, SortKey,
};
pub use source::{HttpQuoteSource, QuoteSource};
pub use view::{Projection, ViewMode};

use std::fmt;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// MarketTableBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`MarketTable`].
///
/// Use [`MarketTable::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](MarketTableBuilder::build).
#[derive(Default)]
pub struct MarketTableBuilder {
    config: Config,
    page_size: Option<usize>,
    source: Option<Arc<dyn QuoteSource>>,
}

impl MarketTableBuilder {
    /// Override the API base URL (defaults to the public CoinGecko v3 API).
    pub fn base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.fetch.base_url = url.into();
        self
    }

    /// Quote currency for prices and market caps. Defaults to `usd`.
    pub fn vs_currency<S: Into<String>>(mut self, currency: S) -> Self {
        self.config.fetch.vs_currency = currency.into();
        self
    }

    /// Number of instruments requested per fetch, `1..=250`. Defaults to 150.
    pub fn fetch_limit(mut self, per_page: u32) -> Self {
        self.config.fetch.per_page = per_page;
        self
    }

    /// HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch.timeout = timeout;
        self
    }

    /// Rows per page. Defaults to 10.
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Width at or below which the card projection is used. Defaults to 768.
    pub fn breakpoint(mut self, width: f32) -> Self {
        self.config.table.breakpoint = width;
        self
    }

    /// Initial viewport width, before the presentation layer reports one.
    pub fn viewport_width(mut self, width: f32) -> Self {
        self.config.table.initial_width = width;
        self
    }

    /// Sort applied before the user picks one. Defaults to name ascending.
    pub fn default_sort(mut self, sort: SortConfig) -> Self {
        self.config.table.default_sort = sort;
        self
    }

    /// Keep the last good batch in `path`.
    ///
    /// Without a cache directory nothing is written to disk.
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Serve batches from the cache only.
    ///
    /// Uses the platform cache directory if [`cache_dir`](Self::cache_dir)
    /// was not set.
    pub fn offline(mut self, offline: bool) -> Self {
        self.config.offline = offline;
        self
    }

    /// Use a custom batch source instead of the HTTP endpoint.
    pub fn source(mut self, source: Arc<dyn QuoteSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Validate the configuration and build the table.
    ///
    /// Does **not** fetch; call [`MarketTable::refresh`] for the first batch.
    pub fn build(mut self) -> Result<MarketTable> {
        if let Some(size) = self.page_size {
            self.config.table.page_size = NonZeroUsize::new(size).ok_or_else(|| {
                MarketTableError::InvalidArgument("page_size must be at least 1".into())
            })?;
        }

        let per_page = self.config.fetch.per_page;
        if !(1..=config::MAX_FETCH_LIMIT).contains(&per_page) {
            return Err(MarketTableError::InvalidArgument(format!(
                "fetch_limit must be within 1..={}, got {}",
                config::MAX_FETCH_LIMIT,
                per_page
            )));
        }

        let breakpoint = self.config.table.breakpoint;
        if !breakpoint.is_finite() || breakpoint < 0.0 {
            return Err(MarketTableError::InvalidArgument(format!(
                "breakpoint must be a finite width >= 0, got {breakpoint}"
            )));
        }

        if self.config.offline && self.config.cache_dir.is_none() {
            self.config.cache_dir = Some(config::default_cache_dir());
        }

        match self.source {
            Some(source) => MarketTable::with_source(self.config, source),
            None => MarketTable::new(self.config),
        }
    }
}

// ---------------------------------------------------------------------------
// MarketTable
// ---------------------------------------------------------------------------

/// A [`TableController`] wired to a [`QuoteSource`] and an optional
/// [`BatchCache`].
///
/// Created via [`MarketTable::builder()`], or directly from a [`Config`].
pub struct MarketTable {
    config: Config,
    controller: TableController,
    source: Arc<dyn QuoteSource>,
    cache: Option<BatchCache>,
}

impl MarketTable {
    /// Create a new builder for configuring the table.
    pub fn builder() -> MarketTableBuilder {
        MarketTableBuilder::default()
    }

    /// Build a table from `config`, choosing the source it implies: the
    /// cache when offline, the HTTP endpoint otherwise.
    pub fn new(config: Config) -> Result<Self> {
        let cache = Self::open_cache(&config)?;
        let source: Arc<dyn QuoteSource> = match (&cache, config.offline) {
            (Some(cache), true) => Arc::new(cache.clone()),
            _ => Arc::new(HttpQuoteSource::new(config.fetch.clone())?),
        };
        Ok(Self::assemble(config, source, cache))
    }

    /// Build a table from `config` that reads batches from `source`.
    pub fn with_source(config: Config, source: Arc<dyn QuoteSource>) -> Result<Self> {
        let cache = Self::open_cache(&config)?;
        Ok(Self::assemble(config, source, cache))
    }

    fn open_cache(config: &Config) -> Result<Option<BatchCache>> {
        match (&config.cache_dir, config.offline) {
            (Some(dir), _) => BatchCache::new(Some(dir.clone())).map(Some),
            (None, true) => BatchCache::new(None).map(Some),
            (None, false) => Ok(None),
        }
    }

    fn assemble(config: Config, source: Arc<dyn QuoteSource>, cache: Option<BatchCache>) -> Self {
        Self {
            controller: TableController::new(config.table),
            config,
            source,
            cache,
        }
    }

    // -- Fetching -----------------------------------------------------------

    /// Fetch a new batch and replace the current one.
    ///
    /// Returns the number of records in the new batch. On failure the
    /// previous batch stays visible, the error is recorded in the snapshot's
    /// `fetch_error`, and the error is returned as well.
    pub fn refresh(&mut self) -> Result<usize> {
        self.controller.on_fetch_started();
        let fetched = self.source.fetch();
        self.apply_fetch(fetched)
    }

    /// Apply the outcome of a fetch that ran elsewhere.
    pub(crate) fn apply_fetch(&mut self, fetched: Result<Vec<Record>>) -> Result<usize> {
        match fetched.and_then(|records| self.controller.on_batch_replaced(records)) {
            Ok(()) => {
                let batch = self.controller.batch();
                if let (Some(cache), false) = (&self.cache, self.config.offline) {
                    if let Err(e) = cache.store(batch) {
                        log::warn!("Failed to cache batch in {}: {}", cache.cache_dir.display(), e);
                    }
                }
                Ok(batch.len())
            }
            Err(e) => {
                log::warn!(
                    "Fetch failed, keeping {} previous records: {}",
                    self.controller.batch().len(),
                    e
                );
                self.controller.on_fetch_failed(e.to_string());
                Err(e)
            }
        }
    }

    #[cfg(feature = "async")]
    pub(crate) fn source(&self) -> Arc<dyn QuoteSource> {
        Arc::clone(&self.source)
    }

    #[cfg(feature = "async")]
    pub(crate) fn mark_fetch_started(&mut self) {
        self.controller.on_fetch_started();
    }

    // -- Intents ------------------------------------------------------------

    /// Sort by `key`, toggling direction when it is already active.
    pub fn set_sort(&mut self, key: SortKey) {
        self.controller.set_sort(key);
    }

    /// Merge a partial filter update.
    pub fn set_filter(&mut self, update: FilterUpdate) -> Result<()> {
        self.controller.set_filter(update)
    }

    /// Jump to page `n` (clamped to the valid range).
    pub fn go_to_page(&mut self, n: usize) {
        self.controller.go_to_page(n);
    }

    pub fn next_page(&mut self) {
        self.controller.next_page();
    }

    pub fn prev_page(&mut self) {
        self.controller.prev_page();
    }

    /// Report the presentation width so the view mode can follow it.
    pub fn set_viewport_width(&mut self, width: f32) {
        self.controller.set_viewport_width(width);
    }

    // -- Output -------------------------------------------------------------

    /// Read-only state after the last intent or fetch.
    pub fn snapshot(&self) -> TableSnapshot {
        self.controller.snapshot()
    }

    /// Display projection of the visible rows in the current view mode.
    pub fn projection(&self) -> Projection {
        self.controller.projection()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return a reference to the underlying [`TableController`].
    pub fn controller(&self) -> &TableController {
        &self.controller
    }

    /// Return a mutable reference to the underlying [`TableController`].
    pub fn controller_mut(&mut self) -> &mut TableController {
        &mut self.controller
    }

    /// Return the batch cache, if one is configured.
    pub fn cache(&self) -> Option<&BatchCache> {
        self.cache.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for MarketTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sort = self.controller.sort_config();
        write!(
            f,
            "MarketTable(records={}, sort={} {:?}, page={}/{}, cache_dir={}, offline={})",
            self.controller.batch().len(),
            sort.key,
            sort.direction,
            self.controller.current_page(),
            self.controller.total_pages(),
            self.config
                .cache_dir
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "none".to_string()),
            self.config.offline
        )
    }
}

impl fmt::Debug for MarketTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
