//! Paper provider module.
//!
//! This module defines how bibliographic data reaches the classifier: a
//! synchronous [`BibliographyParser`] that turns raw bibliography text into
//! [`BibRecord`]s, and an async [`PaperProvider`] that sources whole batches
//! (seed set or candidates) from somewhere such as a file on disk.
//!
//! The BibTeX implementation lives in [`bibtex`].

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BibRecord, Paper};

pub mod bibtex;

/// Errors that can occur when reading or parsing bibliographic data.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Failed to read from the data source
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// No entry of the bibliography could be parsed
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Parses raw bibliography text into records.
///
/// Records come back in source order. A record missing fields is still
/// returned; only text that cannot be parsed at all is an error.
pub trait BibliographyParser: Send + Sync {
    /// Parse `raw` into one record per entry.
    ///
    /// # Errors
    /// Returns `ProviderError::ParseError` if not a single entry of the text
    /// can be parsed
    fn parse(&self, raw: &str) -> ProviderResult<Vec<BibRecord>>;
}

/// Trait for sourcing a batch of papers.
///
/// The classifier itself is synchronous; providers are async so that drivers
/// can read batches from files or remote services without blocking.
#[async_trait]
pub trait PaperProvider: Send + Sync {
    /// Fetch every record this provider holds, in order.
    ///
    /// # Errors
    /// Returns `ProviderError` if the records cannot be read or parsed
    async fn fetch_records(&self) -> ProviderResult<Vec<BibRecord>>;

    /// Fetch every record and convert it to a [`Paper`].
    ///
    /// Missing fields become empty strings; see [`Paper::from_record`].
    async fn fetch_papers(&self) -> ProviderResult<Vec<Paper>> {
        let records = self.fetch_records().await?;
        Ok(records.iter().map(Paper::from_record).collect())
    }

    /// Number of records available.
    async fn count_papers(&self) -> ProviderResult<usize> {
        // Providers with a cheaper count should override this
        self.fetch_records().await.map(|records| records.len())
    }

    /// Human-readable name, used for logging.
    fn name(&self) -> &str;
}
