use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::SortConfig;

pub const API_BASE: &str = "https://api.coingecko.com/api/v3";
pub const MARKETS_PATH: &str = "coins/markets";

pub const DEFAULT_VS_CURRENCY: &str = "usd";
/// Server-side ordering hint. The table always re-sorts locally.
pub const DEFAULT_ORDER_HINT: &str = "market_cap_desc";
pub const DEFAULT_FETCH_LIMIT: u32 = 150;
/// Upper bound the markets endpoint accepts for `per_page`.
pub const MAX_FETCH_LIMIT: u32 = 250;

pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(n) => n,
    None => unreachable!(),
};
/// Viewports at or below this width use the card projection.
pub const CARD_BREAKPOINT: f32 = 768.0;

pub const CACHE_FILE: &str = "markets.json";

// ---------------------------------------------------------------------------
// FetchConfig
// ---------------------------------------------------------------------------

/// Parameters of the markets request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    pub base_url: String,
    pub vs_currency: String,
    pub order: String,
    pub per_page: u32,
    pub page: u32,
    pub sparkline: bool,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE.to_string(),
            vs_currency: DEFAULT_VS_CURRENCY.to_string(),
            order: DEFAULT_ORDER_HINT.to_string(),
            per_page: DEFAULT_FETCH_LIMIT,
            page: 1,
            sparkline: false,
            timeout: Duration::from_secs(30),
        }
    }
}

impl FetchConfig {
    /// Full URL of the markets endpoint.
    pub fn markets_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), MARKETS_PATH)
    }

    /// Query string pairs sent with every markets request.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("vs_currency", self.vs_currency.clone()),
            ("order", self.order.clone()),
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
            ("sparkline", self.sparkline.to_string()),
        ]
    }
}

// ---------------------------------------------------------------------------
// TableConfig
// ---------------------------------------------------------------------------

/// Parameters of the table controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    pub page_size: NonZeroUsize,
    pub breakpoint: f32,
    pub default_sort: SortConfig,
    /// Viewport width assumed until the presentation layer reports one.
    pub initial_width: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            breakpoint: CARD_BREAKPOINT,
            default_sort: SortConfig::default(),
            initial_width: 1024.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Everything a [`MarketTable`](crate::MarketTable) is constructed from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub table: TableConfig,
    /// Where the last good batch is stored. `None` disables the cache.
    pub cache_dir: Option<PathBuf>,
    /// Serve batches from the cache only; never touch the network.
    pub offline: bool,
}

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("market-table")
    } else {
        PathBuf::from(".market-table-cache")
    }
}
