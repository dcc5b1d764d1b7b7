use std::cmp::Ordering;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MarketTableError;
use crate::models::Record;

// ---------------------------------------------------------------------------
// SortKey / SortDirection / SortConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Symbol,
    CurrentPrice,
    PriceChangePercent24h,
    MarketCap,
    Id,
}

/// A borrowed sort value pulled out of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl FieldValue<'_> {
    /// Natural ordering: lexicographic for text, numeric for numbers.
    ///
    /// Mixed kinds never occur for a single key; they compare equal.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            _ => Ordering::Equal,
        }
    }
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Name,
        SortKey::Symbol,
        SortKey::CurrentPrice,
        SortKey::PriceChangePercent24h,
        SortKey::MarketCap,
        SortKey::Id,
    ];

    /// The record field name this key reads, as it appears on the wire.
    pub fn field_name(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Symbol => "symbol",
            SortKey::CurrentPrice => "current_price",
            SortKey::PriceChangePercent24h => "price_change_percentage_24h",
            SortKey::MarketCap => "market_cap",
            SortKey::Id => "id",
        }
    }

    /// Whether the key reads a numeric field.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            SortKey::CurrentPrice | SortKey::PriceChangePercent24h | SortKey::MarketCap
        )
    }

    /// Extract this key's value from a record.
    ///
    /// Returns `None` when the field is missing, or non-finite for numbers.
    pub fn value(self, record: &Record) -> Option<FieldValue<'_>> {
        match self {
            SortKey::Name => record.name().map(FieldValue::Text),
            SortKey::Symbol => record.symbol().map(FieldValue::Text),
            SortKey::Id => Some(FieldValue::Text(&record.id)),
            SortKey::CurrentPrice => record.price().map(FieldValue::Number),
            SortKey::PriceChangePercent24h => record.change_24h().map(FieldValue::Number),
            SortKey::MarketCap => record.market_cap().map(FieldValue::Number),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for SortKey {
    type Err = MarketTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortKey::Name),
            "symbol" => Ok(SortKey::Symbol),
            "current_price" | "currentPrice" => Ok(SortKey::CurrentPrice),
            "price_change_percentage_24h"
            | "price_change_percent_24h"
            | "priceChangePercent24h" => Ok(SortKey::PriceChangePercent24h),
            "market_cap" | "marketCap" => Ok(SortKey::MarketCap),
            "id" => Ok(SortKey::Id),
            other => Err(MarketTableError::InvalidArgument(format!(
                "Unknown sort key: {other}"
            ))),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Apply this direction to an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn ascending(key: SortKey) -> Self {
        Self::new(key, SortDirection::Ascending)
    }

    pub fn descending(key: SortKey) -> Self {
        Self::new(key, SortDirection::Descending)
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        Self::ascending(SortKey::Name)
    }
}

// ---------------------------------------------------------------------------
// FilterState / FilterUpdate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub min_price: f64,
    pub positive_change_only: bool,
    /// Case-insensitive substring matched against name and symbol.
    pub query: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            min_price: 0.0,
            positive_change_only: false,
            query: String::new(),
        }
    }
}

impl FilterState {
    /// Merge the fields present in `update` into this state.
    ///
    /// Rejects a negative or non-finite `min_price` without touching `self`.
    pub fn merge(&mut self, update: FilterUpdate) -> crate::Result<()> {
        if let Some(min) = update.min_price {
            if !min.is_finite() || min < 0.0 {
                return Err(MarketTableError::InvalidArgument(format!(
                    "min_price must be a finite number >= 0, got {min}"
                )));
            }
            self.min_price = min;
        }
        if let Some(flag) = update.positive_change_only {
            self.positive_change_only = flag;
        }
        if let Some(query) = update.query {
            self.query = query;
        }
        Ok(())
    }
}

/// A partial [`FilterState`]; `None` fields are left unchanged.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterUpdate {
    pub min_price: Option<f64>,
    pub positive_change_only: Option<bool>,
    pub query: Option<String>,
}

impl FilterUpdate {
    pub fn min_price(mut self, value: f64) -> Self {
        self.min_price = Some(value);
        self
    }

    pub fn positive_change_only(mut self, value: bool) -> Self {
        self.positive_change_only = Some(value);
        self
    }

    pub fn query<S: Into<String>>(mut self, value: S) -> Self {
        self.query = Some(value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// PaginationState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// 1-based page index.
    pub current_page: usize,
    pub page_size: NonZeroUsize,
}

impl PaginationState {
    pub fn new(current_page: usize, page_size: NonZeroUsize) -> Self {
        Self {
            current_page,
            page_size,
        }
    }

    pub fn first(page_size: NonZeroUsize) -> Self {
        Self::new(1, page_size)
    }
}
