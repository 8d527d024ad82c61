//! Open Library Books API source (primary)
//!
//! API docs: https://openlibrary.org/dev/docs/api/books
//! Queried by bibkey (`ISBN:<isbn>`) with `jscmd=data`, which returns a
//! detailed record keyed by that bibkey, or `{}` when unknown.

use super::traits::{ensure_success, first_labels, BookSource, SourceError, SourceMetadata};
use crate::domain::{join_title, BookRecord, ImageLinks};
use crate::http::HttpClient;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// Fixed description: this endpoint carries no free text.
pub const OPEN_LIBRARY_DESCRIPTION: &str = "Description not available from Open Library.";

/// Identifier prefix for records from this source
pub const OPEN_LIBRARY_ID_PREFIX: &str = "ol";

#[derive(Debug, Deserialize)]
struct OpenLibraryBook {
    title: Option<String>,
    subtitle: Option<String>,
    #[serde(default)]
    authors: Vec<NamedEntry>,
    #[serde(default)]
    publishers: Vec<NamedEntry>,
    publish_date: Option<String>,
    number_of_pages: Option<u32>,
    #[serde(default)]
    subjects: Vec<NamedEntry>,
    #[serde(default)]
    identifiers: OpenLibraryIdentifiers,
    cover: Option<OpenLibraryCover>,
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenLibraryIdentifiers {
    #[serde(default)]
    isbn_13: Vec<String>,
    #[serde(default)]
    isbn_10: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryCover {
    small: Option<String>,
    medium: Option<String>,
    large: Option<String>,
}

pub struct OpenLibrarySource {
    client: HttpClient,
    base_url: String,
}

impl OpenLibrarySource {
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn source_metadata() -> SourceMetadata {
        SourceMetadata {
            id: "openlibrary",
            name: "Open Library",
            description: "Detailed edition records keyed by ISBN",
            base_url: "https://openlibrary.org",
            requires_api_key: false,
        }
    }

    /// Parse a Books API response for `isbn`.
    ///
    /// Returns `Ok(None)` when the response has no entry for the bibkey, or
    /// the entry is empty.
    pub fn parse_books_response(json: &str, isbn: &str) -> Result<Option<BookRecord>, SourceError> {
        let mut response: HashMap<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| SourceError::Parse(format!("Invalid Open Library JSON: {}", e)))?;

        let entry = match response.remove(&bibkey(isbn)) {
            Some(serde_json::Value::Object(map)) if !map.is_empty() => {
                serde_json::Value::Object(map)
            }
            _ => return Ok(None),
        };

        let book: OpenLibraryBook = serde_json::from_value(entry)
            .map_err(|e| SourceError::Parse(format!("Unexpected Open Library record: {}", e)))?;

        Ok(Some(Self::to_record(book, isbn)))
    }

    fn to_record(book: OpenLibraryBook, queried_isbn: &str) -> BookRecord {
        let best_isbn = book
            .identifiers
            .isbn_13
            .into_iter()
            .chain(book.identifiers.isbn_10)
            .find(|s| !s.trim().is_empty())
            .unwrap_or_else(|| queried_isbn.to_string());

        let title = join_title(
            book.title.as_deref().unwrap_or("Untitled"),
            book.subtitle.as_deref(),
        );

        let image_links = book.cover.and_then(|c| {
            ImageLinks {
                thumbnail: c.large.clone().or_else(|| c.medium.clone()).or_else(|| c.small.clone()),
                small_thumbnail: c.small.or(c.medium),
            }
            .non_empty()
        });

        let mut record = BookRecord::new(format!("{}-{}", OPEN_LIBRARY_ID_PREFIX, best_isbn), title)
            .with_authors(Some(book.authors.into_iter().filter_map(|a| a.name).collect()))
            .with_isbn(Some(best_isbn));
        record.publisher = book.publishers.into_iter().find_map(|p| p.name);
        record.published_date = book.publish_date;
        record.description = Some(OPEN_LIBRARY_DESCRIPTION.to_string());
        record.categories = first_labels(book.subjects.into_iter().filter_map(|s| s.name), 3);
        record.page_count = book.number_of_pages;
        record.image_links = image_links;
        record
    }
}

#[async_trait]
impl BookSource for OpenLibrarySource {
    fn metadata(&self) -> SourceMetadata {
        Self::source_metadata()
    }

    async fn lookup(&self, isbn: &str) -> Result<Option<BookRecord>, SourceError> {
        let url = format!("{}/api/books", self.base_url);
        let key = bibkey(isbn);
        let response = self
            .client
            .get_with_params(&url, &[("bibkeys", key.as_str()), ("format", "json"), ("jscmd", "data")])
            .await?;
        ensure_success(&response)?;
        Self::parse_books_response(&response.body, isbn)
    }
}

fn bibkey(isbn: &str) -> String {
    format!("ISBN:{}", isbn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_no_record() {
        assert_eq!(
            OpenLibrarySource::parse_books_response("{}", "9780134685991").unwrap(),
            None
        );
        assert_eq!(
            OpenLibrarySource::parse_books_response(r#"{"ISBN:9780134685991": {}}"#, "9780134685991")
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_other_key_is_no_record() {
        let json = r#"{"ISBN:0000000000": {"title": "Other"}}"#;
        assert_eq!(
            OpenLibrarySource::parse_books_response(json, "9780134685991").unwrap(),
            None
        );
    }

    #[test]
    fn test_minimal_record_degrades_gracefully() {
        let json = r#"{"ISBN:9780134685991": {"title": "Effective Java"}}"#;
        let book = OpenLibrarySource::parse_books_response(json, "9780134685991")
            .unwrap()
            .unwrap();
        assert_eq!(book.id, "ol-9780134685991");
        assert_eq!(book.isbn, "9780134685991");
        assert_eq!(book.authors, vec!["Unknown Author"]);
        assert_eq!(book.categories, None);
        assert_eq!(book.image_links, None);
        assert_eq!(book.description.as_deref(), Some(OPEN_LIBRARY_DESCRIPTION));
    }

    #[test]
    fn test_cover_prefers_larger_variant() {
        let json = r#"{"ISBN:1": {"title": "T", "cover": {"small": "s", "medium": "m"}}}"#;
        let book = OpenLibrarySource::parse_books_response(json, "1").unwrap().unwrap();
        let links = book.image_links.unwrap();
        assert_eq!(links.thumbnail.as_deref(), Some("m"));
        assert_eq!(links.small_thumbnail.as_deref(), Some("s"));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        assert!(matches!(
            OpenLibrarySource::parse_books_response("<html>", "1"),
            Err(SourceError::Parse(_))
        ));
    }
}
