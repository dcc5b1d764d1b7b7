//! Async wrapper around [`MarketTable`] for use in async runtimes (Tokio, etc.).
//!
//! The blocking fetch runs on [`tokio::task::spawn_blocking`] without holding
//! the table lock, so intents keep working against the previous batch while a
//! refresh is in flight. Results are applied in completion order: when two
//! refreshes overlap, whichever finishes last wins.
//!
//! # Example
//!
//! ```no_run
//! use market_table::{AsyncMarketTable, SortKey};
//!
//! #[tokio::main]
//! async fn main() {
//!     let table = AsyncMarketTable::builder().build().await.unwrap();
//!     table.refresh().await.unwrap();
//!
//!     table.run(|t| t.set_sort(SortKey::MarketCap)).await.unwrap();
//!     let snapshot = table.snapshot().await.unwrap();
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{MarketTableError, Result};
use crate::{MarketTable, MarketTableBuilder, TableSnapshot};

// ---------------------------------------------------------------------------
// AsyncMarketTableBuilder
// ---------------------------------------------------------------------------

/// Builder for an [`AsyncMarketTable`]; wraps a [`MarketTableBuilder`].
#[derive(Default)]
pub struct AsyncMarketTableBuilder {
    inner: MarketTableBuilder,
}

impl AsyncMarketTableBuilder {
    /// Configure the underlying [`MarketTableBuilder`].
    pub fn configure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(MarketTableBuilder) -> MarketTableBuilder,
    {
        self.inner = f(self.inner);
        self
    }

    /// Build the async table.
    ///
    /// Construction creates the cache directory and HTTP client, so it runs
    /// on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncMarketTable> {
        let inner = self.inner;
        tokio::task::spawn_blocking(move || {
            let table = inner.build()?;
            Ok(AsyncMarketTable {
                inner: Arc::new(Mutex::new(table)),
            })
        })
        .await
        .map_err(|e| MarketTableError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncMarketTable
// ---------------------------------------------------------------------------

/// Async wrapper around [`MarketTable`].
///
/// Cloning is cheap and shares the same table.
#[derive(Clone)]
pub struct AsyncMarketTable {
    inner: Arc<Mutex<MarketTable>>,
}

impl AsyncMarketTable {
    /// Create a new builder for configuring the async table.
    pub fn builder() -> AsyncMarketTableBuilder {
        AsyncMarketTableBuilder::default()
    }

    /// Wrap an already built table.
    pub fn from_table(table: MarketTable) -> Self {
        Self {
            inner: Arc::new(Mutex::new(table)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MarketTable>> {
        self.inner
            .lock()
            .map_err(|_| MarketTableError::InvalidArgument("Table lock poisoned".into()))
    }

    /// Fetch a new batch without blocking intents.
    ///
    /// The table is marked as loading, the fetch runs on the blocking pool
    /// with the lock released, and the outcome is applied once it arrives.
    pub async fn refresh(&self) -> Result<usize> {
        let source = {
            let mut table = self.lock()?;
            table.mark_fetch_started();
            table.source()
        };

        // A panicked fetch still has to settle the pending count.
        let fetched = tokio::task::spawn_blocking(move || source.fetch())
            .await
            .unwrap_or_else(|e| {
                Err(MarketTableError::Io(std::io::Error::other(format!(
                    "Fetch task failed: {e}"
                ))))
            });

        self.lock()?.apply_fetch(fetched)
    }

    /// Run an intent or query against the table.
    ///
    /// The closure runs while the lock is held; keep it short and
    /// non-blocking.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut MarketTable) -> T,
    {
        let mut table = self.lock()?;
        Ok(f(&mut table))
    }

    /// Read-only state after the last intent or fetch.
    pub async fn snapshot(&self) -> Result<TableSnapshot> {
        self.run(|t| t.snapshot()).await
    }
}
