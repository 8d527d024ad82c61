//! ISBN extraction from text

use super::validators::{is_valid_isbn, normalize_isbn};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // ISBN regex: ISBN-10 and ISBN-13, optionally prefixed and hyphenated
    static ref ISBN_REGEX: Regex = Regex::new(
        r"(?i)(?:isbn(?:-1[03])?[:\s-]*)?(?P<isbn>(?:97[89][- ]?)?(?:\d[- ]?){9}[\dxX])"
    ).unwrap();
}

/// Extract checksum-valid ISBNs from text, normalized to digits (and `X`).
pub fn extract_isbns(text: &str) -> Vec<String> {
    ISBN_REGEX
        .captures_iter(text)
        .filter_map(|cap| cap.name("isbn"))
        .map(|m| normalize_isbn(m.as_str()))
        .filter(|isbn| is_valid_isbn(isbn))
        .collect()
}

/// First checksum-valid ISBN in the text, if any.
pub fn first_isbn(text: &str) -> Option<String> {
    extract_isbns(text).into_iter().next()
}
