//! Viewport-driven choice between the tabular and card projections.
//!
//! Both projections are built from the same paginated window; the mode only
//! changes how rows are laid out, never which rows are shown.

use serde::{Deserialize, Serialize};

use crate::models::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Tabular,
    Card,
}

/// Pick the projection for a viewport `width`.
///
/// Widths at or below `breakpoint` get the card list.
pub fn select_view(width: f32, breakpoint: f32) -> ViewMode {
    if width <= breakpoint {
        ViewMode::Card
    } else {
        ViewMode::Tabular
    }
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// `Up` for strictly positive change, `Down` otherwise.
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub price: String,
    pub change_24h: String,
    pub trend: Option<Trend>,
    pub market_cap: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRow {
    pub id: String,
    /// `"Bitcoin (BTC)"`
    pub title: String,
    pub price: String,
    pub change_24h: String,
    pub trend: Option<Trend>,
    pub market_cap: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "rows", rename_all = "snake_case")]
pub enum Projection {
    Tabular(Vec<TableRow>),
    Card(Vec<CardRow>),
}

impl Projection {
    pub fn mode(&self) -> ViewMode {
        match self {
            Projection::Tabular(_) => ViewMode::Tabular,
            Projection::Card(_) => ViewMode::Card,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Projection::Tabular(rows) => rows.len(),
            Projection::Card(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Project `rows` for display in `mode`.
pub fn project(rows: &[Record], mode: ViewMode) -> Projection {
    match mode {
        ViewMode::Tabular => Projection::Tabular(rows.iter().map(table_row).collect()),
        ViewMode::Card => Projection::Card(rows.iter().map(card_row).collect()),
    }
}

fn table_row(record: &Record) -> TableRow {
    TableRow {
        id: record.id.clone(),
        name: record.name().unwrap_or(MISSING).to_string(),
        symbol: display_symbol(record),
        price: format_usd(record.price()),
        change_24h: format_percent(record.change_24h()),
        trend: record.change_24h().map(Trend::from_change),
        market_cap: format_usd(record.market_cap()),
    }
}

fn card_row(record: &Record) -> CardRow {
    CardRow {
        id: record.id.clone(),
        title: format!(
            "{} ({})",
            record.name().unwrap_or(MISSING),
            display_symbol(record)
        ),
        price: format_usd(record.price()),
        change_24h: format_percent(record.change_24h()),
        trend: record.change_24h().map(Trend::from_change),
        market_cap: format_usd(record.market_cap()),
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

const MISSING: &str = "-";

fn display_symbol(record: &Record) -> String {
    record
        .symbol()
        .map_or_else(|| MISSING.to_string(), str::to_uppercase)
}

fn format_usd(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${}", format_grouped(v)),
        None => MISSING.to_string(),
    }
}

fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => MISSING.to_string(),
    }
}

/// Format `value` with comma thousands separators and at most three
/// fraction digits, trailing zeros dropped (`1234.5 -> "1,234.5"`).
pub fn format_grouped(value: f64) -> String {
    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}
