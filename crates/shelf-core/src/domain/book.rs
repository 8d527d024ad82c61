//! Book record domain model

use super::BookStatus;
use serde::{Deserialize, Serialize};

/// Author placeholder used when a source omits author data.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// ISBN sentinel used when no ISBN could be determined.
pub const ISBN_NOT_AVAILABLE: &str = "N/A";

/// Cover image URLs. `thumbnail` is the larger variant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_thumbnail: Option<String>,
}

impl ImageLinks {
    /// Returns `None` when neither variant is set.
    pub fn non_empty(self) -> Option<Self> {
        if self.thumbnail.is_none() && self.small_thumbnail.is_none() {
            None
        } else {
            Some(self)
        }
    }
}

/// Which cover variant a view wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    /// List rows (40x60 placeholder)
    Small,
    /// Detail view (200x300 placeholder)
    Large,
}

/// A book, normalized from whichever metadata source produced it.
///
/// Serialized with camelCase keys; this is the persisted collection format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_links: Option<ImageLinks>,
    pub isbn: String,
    #[serde(default)]
    pub status: BookStatus,
}

impl BookRecord {
    /// Create a record with the required fields; everything else is empty,
    /// authors fall back to the placeholder and status is `available`.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: normalize_authors(None),
            publisher: None,
            published_date: None,
            description: None,
            categories: None,
            page_count: None,
            image_links: None,
            isbn: ISBN_NOT_AVAILABLE.to_string(),
            status: BookStatus::Available,
        }
    }

    pub fn with_authors(mut self, authors: Option<Vec<String>>) -> Self {
        self.authors = normalize_authors(authors);
        self
    }

    pub fn with_isbn(mut self, isbn: Option<String>) -> Self {
        self.isbn = isbn
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| ISBN_NOT_AVAILABLE.to_string());
        self
    }

    /// Authors joined for display and export.
    pub fn authors_display(&self) -> String {
        self.authors.join(", ")
    }

    /// True when a record with the same id is in `books`.
    pub fn is_in(&self, books: &[BookRecord]) -> bool {
        books.iter().any(|b| b.id == self.id)
    }

    /// Cover to show for this record. Falls back to a placeholder image
    /// seeded with the record id so every book gets a stable picture.
    pub fn cover_url(&self, size: CoverSize) -> String {
        let links = self.image_links.as_ref();
        let found = match size {
            CoverSize::Small => links.and_then(|l| l.small_thumbnail.clone()),
            CoverSize::Large => links.and_then(|l| l.thumbnail.clone()),
        };
        found.unwrap_or_else(|| {
            let (w, h) = match size {
                CoverSize::Small => (40, 60),
                CoverSize::Large => (200, 300),
            };
            format!(
                "https://picsum.photos/seed/{}/{}/{}",
                urlencoding::encode(&self.id),
                w,
                h
            )
        })
    }
}

/// Clean an author list: trims names, drops blanks, and falls back to
/// `["Unknown Author"]` so the list is never empty.
pub fn normalize_authors(authors: Option<Vec<String>>) -> Vec<String> {
    let cleaned: Vec<String> = authors
        .unwrap_or_default()
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();

    if cleaned.is_empty() {
        vec![UNKNOWN_AUTHOR.to_string()]
    } else {
        cleaned
    }
}

/// Append `": subtitle"` to a title when a subtitle is present.
pub fn join_title(title: &str, subtitle: Option<&str>) -> String {
    match subtitle.map(str::trim).filter(|s| !s.is_empty()) {
        Some(sub) => format!("{}: {}", title.trim(), sub),
        None => title.trim().to_string(),
    }
}
