//! Common traits for metadata sources

use crate::domain::BookRecord;
use crate::http::{HttpError, HttpResponse};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Http(HttpError),
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Rate limited")]
    RateLimit,
}

impl From<HttpError> for SourceError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::RateLimited => SourceError::RateLimit,
            other => SourceError::Http(other),
        }
    }
}

/// Metadata about a source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub base_url: &'static str,
    pub requires_api_key: bool,
}

/// A book-metadata provider that can be asked for one ISBN.
#[async_trait]
pub trait BookSource: Send + Sync {
    fn metadata(&self) -> SourceMetadata;

    /// Look up a cleaned ISBN (digits, no hyphens).
    ///
    /// `Ok(None)` means the source answered but has no record for the ISBN.
    async fn lookup(&self, isbn: &str) -> Result<Option<BookRecord>, SourceError>;
}

/// Reject non-2xx responses.
pub(crate) fn ensure_success(response: &HttpResponse) -> Result<(), SourceError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(SourceError::Status(response.status))
    }
}

/// First `n` non-blank labels, or `None` when there are none.
pub(crate) fn first_labels<I>(labels: I, n: usize) -> Option<Vec<String>>
where
    I: IntoIterator<Item = String>,
{
    let picked: Vec<String> = labels
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .take(n)
        .collect();
    if picked.is_empty() {
        None
    } else {
        Some(picked)
    }
}
