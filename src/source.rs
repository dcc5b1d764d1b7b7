//! Where record batches come from.
//!
//! [`QuoteSource`] is the seam between the table and the network. The
//! [`HttpQuoteSource`] talks to the markets endpoint; tests and offline mode
//! plug in other implementations.

use reqwest::blocking::Client;

use crate::config::FetchConfig;
use crate::error::Result;
use crate::models::{validate_batch, Record};

/// A one-shot provider of a complete record batch.
pub trait QuoteSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<Record>>;
}

/// Parse a markets response body into a batch.
///
/// Fails when the body is not a JSON array of records or when two records
/// share an id.
pub fn parse_batch(body: &str) -> Result<Vec<Record>> {
    let records: Vec<Record> = serde_json::from_str(body)?;
    validate_batch(&records)?;
    Ok(records)
}

// ---------------------------------------------------------------------------
// HttpQuoteSource
// ---------------------------------------------------------------------------

/// Fetches batches from the `coins/markets` endpoint.
pub struct HttpQuoteSource {
    config: FetchConfig,
    client: Client,
}

impl HttpQuoteSource {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self::with_client(config, client))
    }

    /// Use a preconfigured client (proxy, default headers, API keys).
    ///
    /// `config.timeout` is ignored; the client's own settings apply.
    pub fn with_client(config: FetchConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

impl QuoteSource for HttpQuoteSource {
    fn fetch(&self) -> Result<Vec<Record>> {
        let url = self.config.markets_url();
        log::debug!("Fetching {}", url);

        let body = self
            .client
            .get(&url)
            .query(&self.config.query_pairs())
            .send()?
            .error_for_status()?
            .text()?;

        let records = parse_batch(&body)?;
        log::debug!("Fetched {} records from {}", records.len(), url);
        Ok(records)
    }
}
