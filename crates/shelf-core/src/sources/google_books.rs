//! Google Books source (secondary fallback)
//!
//! API docs: https://developers.google.com/books/docs/v1/using
//! Queried with `q=isbn:<isbn>`; the first volume wins.

use super::traits::{ensure_success, BookSource, SourceError, SourceMetadata};
use crate::domain::{join_title, BookRecord, ImageLinks};
use crate::http::HttpClient;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

/// Identifier prefix for records from this source
pub const GOOGLE_BOOKS_ID_PREFIX: &str = "gb";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumesResponse {
    #[serde(default)]
    total_items: u32,
    #[serde(default)]
    items: Vec<VolumeItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeItem {
    id: String,
    volume_info: VolumeInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    subtitle: Option<String>,
    authors: Option<Vec<String>>,
    publisher: Option<String>,
    published_date: Option<String>,
    description: Option<String>,
    #[serde(default)]
    industry_identifiers: Vec<IndustryIdentifier>,
    page_count: Option<u32>,
    categories: Option<Vec<String>>,
    image_links: Option<VolumeImageLinks>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeImageLinks {
    small_thumbnail: Option<String>,
    thumbnail: Option<String>,
}

pub struct GoogleBooksSource {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksSource {
    /// Without an API key requests go out unauthenticated and are subject to
    /// Google's anonymous quota.
    pub fn new(client: HttpClient, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!(
                "No Google Books API key configured (set {}); requests will be anonymous",
                crate::config::GOOGLE_BOOKS_API_KEY_ENV
            );
        }
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn source_metadata() -> SourceMetadata {
        SourceMetadata {
            id: "googlebooks",
            name: "Google Books",
            description: "Google Books volume search",
            base_url: "https://www.googleapis.com/books/v1/volumes",
            requires_api_key: false,
        }
    }

    /// Parse a volumes response; only the first item is used.
    pub fn parse_volumes_response(json: &str) -> Result<Option<BookRecord>, SourceError> {
        let response: VolumesResponse = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Invalid Google Books JSON: {}", e)))?;

        if response.total_items == 0 && response.items.is_empty() {
            return Ok(None);
        }
        Ok(response.items.into_iter().next().map(Self::to_record))
    }

    fn to_record(item: VolumeItem) -> BookRecord {
        let info = item.volume_info;

        // ISBN-13 beats ISBN-10 regardless of list order
        let isbn = ["ISBN_13", "ISBN_10"].iter().find_map(|kind| {
            info.industry_identifiers
                .iter()
                .find(|id| id.kind == *kind)
                .map(|id| id.identifier.clone())
        });

        let title = join_title(
            info.title.as_deref().unwrap_or("Untitled"),
            info.subtitle.as_deref(),
        );

        let mut record = BookRecord::new(format!("{}-{}", GOOGLE_BOOKS_ID_PREFIX, item.id), title)
            .with_authors(info.authors)
            .with_isbn(isbn);
        record.publisher = info.publisher;
        record.published_date = info.published_date;
        record.description = info.description;
        record.categories = info.categories;
        record.page_count = info.page_count;
        record.image_links = info.image_links.and_then(|l| {
            ImageLinks {
                thumbnail: l.thumbnail,
                small_thumbnail: l.small_thumbnail,
            }
            .non_empty()
        });
        record
    }
}

#[async_trait]
impl BookSource for GoogleBooksSource {
    fn metadata(&self) -> SourceMetadata {
        Self::source_metadata()
    }

    async fn lookup(&self, isbn: &str) -> Result<Option<BookRecord>, SourceError> {
        let url = format!("{}/books/v1/volumes", self.base_url);
        let query = format!("isbn:{}", isbn);
        let mut params = vec![("q", query.as_str())];
        if let Some(key) = &self.api_key {
            params.push(("key", key.as_str()));
        }

        let response = self.client.get_with_params(&url, &params).await?;
        ensure_success(&response)?;
        Self::parse_volumes_response(&response.body)
    }
}
