use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{MarketTableError, Result};

// ---------------------------------------------------------------------------
// Record: one instrument quote as returned by the markets endpoint
// ---------------------------------------------------------------------------

/// A single market quote.
///
/// Everything but `id` is optional: the upstream API reports `null` for
/// instruments it has no data for, and a value of the wrong JSON type is
/// read as missing. Use the accessor methods rather than the raw fields when
/// a well-formed value is required; the numeric ones also reject non-finite
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub current_price: Option<f64>,
    #[serde(
        default,
        rename = "price_change_percentage_24h",
        deserialize_with = "lenient_number"
    )]
    pub price_change_percent_24h: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub market_cap: Option<f64>,
}

impl Record {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Raw symbol as sent upstream (usually lowercase).
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Current price in USD, if present and finite.
    pub fn price(&self) -> Option<f64> {
        self.current_price.filter(|v| v.is_finite())
    }

    /// 24h change in percentage points, if present and finite.
    pub fn change_24h(&self) -> Option<f64> {
        self.price_change_percent_24h.filter(|v| v.is_finite())
    }

    /// Market capitalisation, if present and finite.
    pub fn market_cap(&self) -> Option<f64> {
        self.market_cap.filter(|v| v.is_finite())
    }
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Check that every record id in `records` is unique.
pub fn validate_batch(records: &[Record]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id.as_str()) {
            return Err(MarketTableError::DuplicateId(record.id.clone()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// MalformedRecord: a record excluded for a missing required field
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MalformedRecord {
    pub id: String,
    pub field: String,
}
