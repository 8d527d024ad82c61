//! Open Library Search API source (fallback)
//!
//! API docs: https://openlibrary.org/dev/docs/api/search
//! The ISBN is sent as a free-text query; the first result document wins.
//! Search documents are work-level, so confidence is lower than the Books API.

use super::traits::{ensure_success, first_labels, BookSource, SourceError, SourceMetadata};
use crate::domain::{join_title, BookRecord, ImageLinks, ISBN_NOT_AVAILABLE};
use crate::http::HttpClient;
use crate::identifiers::is_isbn_shaped;
use async_trait::async_trait;
use serde::Deserialize;

/// Fixed description marking the record as a search hit.
pub const SEARCH_DESCRIPTION: &str = "Limited information available (found via search).";

/// Identifier prefix for records from this source
pub const SEARCH_ID_PREFIX: &str = "ols";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    title: Option<String>,
    subtitle: Option<String>,
    author_name: Option<Vec<String>>,
    #[serde(default)]
    publisher: Vec<String>,
    first_publish_year: Option<i32>,
    publish_date: Option<Vec<String>>,
    #[serde(default)]
    isbn: Vec<String>,
    cover_i: Option<i64>,
    number_of_pages_median: Option<u32>,
    #[serde(default)]
    subject: Vec<String>,
}

pub struct OpenLibrarySearchSource {
    client: HttpClient,
    base_url: String,
    covers_url: String,
}

impl OpenLibrarySearchSource {
    pub fn new(
        client: HttpClient,
        base_url: impl Into<String>,
        covers_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            covers_url: covers_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn source_metadata() -> SourceMetadata {
        SourceMetadata {
            id: "openlibrary-search",
            name: "Open Library Search",
            description: "Keyword search over Open Library works",
            base_url: "https://openlibrary.org/search.json",
            requires_api_key: false,
        }
    }

    /// Parse a search response; only the first document is used.
    pub fn parse_search_response(
        json: &str,
        covers_url: &str,
    ) -> Result<Option<BookRecord>, SourceError> {
        let response: SearchResponse = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Invalid Open Library search JSON: {}", e)))?;

        Ok(response
            .docs
            .into_iter()
            .next()
            .map(|doc| Self::to_record(doc, covers_url)))
    }

    fn to_record(doc: SearchDoc, covers_url: &str) -> BookRecord {
        let isbn = doc
            .isbn
            .iter()
            .find(|s| is_isbn_shaped(s))
            .cloned()
            .unwrap_or_else(|| ISBN_NOT_AVAILABLE.to_string());

        let title = join_title(
            doc.title.as_deref().unwrap_or("Untitled"),
            doc.subtitle.as_deref(),
        );

        let published_date = doc
            .first_publish_year
            .map(|y| y.to_string())
            .or_else(|| doc.publish_date.and_then(|d| d.into_iter().next()));

        let image_links = doc.cover_i.filter(|id| *id > 0).map(|id| ImageLinks {
            thumbnail: Some(cover_url(covers_url, id, 'L')),
            small_thumbnail: Some(cover_url(covers_url, id, 'S')),
        });

        let mut record = BookRecord::new(format!("{}-{}", SEARCH_ID_PREFIX, isbn), title)
            .with_authors(doc.author_name)
            .with_isbn(Some(isbn));
        record.publisher = doc.publisher.into_iter().next();
        record.published_date = published_date;
        record.description = Some(SEARCH_DESCRIPTION.to_string());
        record.categories = first_labels(doc.subject, 3);
        record.page_count = doc.number_of_pages_median;
        record.image_links = image_links;
        record
    }
}

/// Cover image URL for an Open Library cover id. `size` is `S`, `M` or `L`.
pub fn cover_url(covers_url: &str, cover_id: i64, size: char) -> String {
    format!("{}/b/id/{}-{}.jpg", covers_url, cover_id, size)
}

#[async_trait]
impl BookSource for OpenLibrarySearchSource {
    fn metadata(&self) -> SourceMetadata {
        Self::source_metadata()
    }

    async fn lookup(&self, isbn: &str) -> Result<Option<BookRecord>, SourceError> {
        let url = format!("{}/search.json", self.base_url);
        let response = self.client.get_with_params(&url, &[("q", isbn)]).await?;
        ensure_success(&response)?;
        Self::parse_search_response(&response.body, &self.covers_url)
    }
}
