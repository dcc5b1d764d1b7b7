#[derive(Debug, thiserror::Error)]
pub enum MarketTableError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Duplicate record id in batch: {0}")]
    DuplicateId(String),
}

impl MarketTableError {
    /// Whether this error means a fetch produced no usable batch.
    ///
    /// Fetch failures are recoverable: the table keeps its last good batch.
    pub fn is_fetch_failure(&self) -> bool {
        !matches!(self, MarketTableError::InvalidArgument(_))
    }
}

pub type Result<T> = std::result::Result<T, MarketTableError>;
