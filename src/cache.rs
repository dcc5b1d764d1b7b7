//! Local cache of the last successfully fetched batch.
//!
//! The batch is written as `markets.json` in the cache directory. Writes go
//! to a temp file in the same directory and are persisted over the old file,
//! so an interrupted write never leaves a truncated batch behind. In offline
//! mode the cache itself is the [`QuoteSource`].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config;
use crate::error::{MarketTableError, Result};
use crate::models::Record;
use crate::source::{parse_batch, QuoteSource};

#[derive(Debug, Clone)]
pub struct BatchCache {
    /// Directory where the cached batch is stored.
    pub cache_dir: PathBuf,
}

impl BatchCache {
    /// Create a cache rooted at `cache_dir`, or the platform default.
    ///
    /// Creates the directory if it does not exist.
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self { cache_dir: dir })
    }

    /// Path of the cached batch file.
    pub fn path(&self) -> PathBuf {
        self.cache_dir.join(config::CACHE_FILE)
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Store `records` as the last good batch.
    pub fn store(&self, records: &[Record]) -> Result<()> {
        let body = serde_json::to_vec(records)?;
        let mut tmp = NamedTempFile::new_in(&self.cache_dir)?;
        tmp.write_all(&body)?;
        tmp.persist(self.path()).map_err(|e| e.error)?;
        Ok(())
    }

    /// Load the cached batch.
    ///
    /// A corrupt file is deleted so the next successful fetch can replace it.
    pub fn load(&self) -> Result<Vec<Record>> {
        let path = self.path();
        if !path.exists() {
            return Err(MarketTableError::NotFound(format!(
                "No cached batch at {}",
                path.display()
            )));
        }

        let contents = fs::read_to_string(&path)?;
        match parse_batch(&contents) {
            Ok(records) => Ok(records),
            Err(e) => {
                log::warn!("Corrupt cache file {}: {} -- removing", path.display(), e);
                let _ = fs::remove_file(&path);
                Err(MarketTableError::NotFound(format!(
                    "Cache file '{}' was corrupt and has been removed. Original error: {}",
                    file_name(&path),
                    e
                )))
            }
        }
    }

    /// Remove the cached batch, if any.
    pub fn clear(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl QuoteSource for BatchCache {
    fn fetch(&self) -> Result<Vec<Record>> {
        self.load()
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
}
