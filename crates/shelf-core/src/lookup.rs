//! ISBN lookup across metadata sources
//!
//! Sources are tried strictly in order. A source that errors or has no
//! record is logged and skipped; the first record wins and is never merged
//! with data from other sources.

use crate::config::Config;
use crate::domain::BookRecord;
use crate::error::LookupError;
use crate::http::HttpError;
use crate::identifiers::clean_isbn_query;
use crate::sources::{default_sources, BookSource, SourceMetadata};
use tracing::{debug, info, warn};

pub struct Lookup {
    sources: Vec<Box<dyn BookSource>>,
}

impl Lookup {
    pub fn new(sources: Vec<Box<dyn BookSource>>) -> Self {
        Self { sources }
    }

    /// Open Library Books, then Open Library Search, then Google Books.
    pub fn from_config(config: &Config) -> Result<Self, HttpError> {
        Ok(Self::new(default_sources(config)?))
    }

    /// Metadata for each source, in the order they are tried.
    pub fn sources(&self) -> Vec<SourceMetadata> {
        self.sources.iter().map(|s| s.metadata()).collect()
    }

    pub fn source_ids(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.metadata().id).collect()
    }

    /// Find a book by ISBN.
    ///
    /// Empty input fails with `LookupError::Validation` before any source is
    /// contacted. Hyphens and surrounding whitespace are removed before the
    /// query. Fails with `LookupError::NotFound` when every source comes up
    /// empty.
    pub async fn find_by_isbn(&self, raw: &str) -> Result<BookRecord, LookupError> {
        let isbn = clean_isbn_query(raw)?;

        for source in &self.sources {
            let meta = source.metadata();
            debug!(source = meta.id, %isbn, "trying source");

            match source.lookup(&isbn).await {
                Ok(Some(record)) => {
                    info!(source = meta.id, %isbn, id = %record.id, "book found");
                    return Ok(record);
                }
                Ok(None) => {
                    debug!(source = meta.id, %isbn, "no record");
                }
                Err(e) => {
                    warn!(source = meta.id, %isbn, error = %e, "source lookup failed");
                }
            }
        }

        Err(LookupError::NotFound { isbn })
    }
}
