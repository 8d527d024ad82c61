//! Metadata sources for ISBN lookup
//!
//! Each source turns one provider's response shape into a `BookRecord`.
//! The parse step of every source is a plain function over the response body.

pub mod google_books;
pub mod openlibrary;
pub mod openlibrary_search;
pub mod traits;

pub use google_books::*;
pub use openlibrary::*;
pub use openlibrary_search::*;
pub use traits::*;

use crate::config::Config;
use crate::http::{HttpClient, HttpError};

/// The standard source chain in priority order:
/// Open Library Books, Open Library Search, Google Books.
pub fn default_sources(config: &Config) -> Result<Vec<Box<dyn BookSource>>, HttpError> {
    let client = HttpClient::new(&config.sources.user_agent, config.request_timeout())?;
    let ol = &config.sources.open_library;
    let gb = &config.sources.google_books;

    Ok(vec![
        Box::new(OpenLibrarySource::new(client.clone(), ol.base_url.clone())),
        Box::new(OpenLibrarySearchSource::new(
            client.clone(),
            ol.base_url.clone(),
            ol.covers_url.clone(),
        )),
        Box::new(GoogleBooksSource::new(
            client,
            gb.base_url.clone(),
            gb.api_key.clone(),
        )),
    ])
}
