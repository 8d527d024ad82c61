//! ISBN and EAN-13 validation

use crate::error::LookupError;

/// Turn raw user input into the key sent to metadata sources.
///
/// Whitespace is trimmed and hyphens removed. Nothing else is altered, so a
/// mistyped ISBN still reaches the sources (which may know it under a
/// different edition). Empty input is a validation error.
pub fn clean_isbn_query(raw: &str) -> Result<String, LookupError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LookupError::Validation("ISBN is required.".to_string()));
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != '-').collect();
    if cleaned.trim().is_empty() {
        return Err(LookupError::Validation("ISBN is required.".to_string()));
    }
    Ok(cleaned)
}

/// Keep only digits and `X`, uppercased.
pub fn normalize_isbn(isbn: &str) -> String {
    isbn.chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
        .collect::<String>()
        .to_uppercase()
}

/// Validate an ISBN-10 or ISBN-13 checksum. Hyphens and spaces are ignored.
pub fn is_valid_isbn(isbn: &str) -> bool {
    let normalized = normalize_isbn(isbn);
    match normalized.len() {
        10 => validate_isbn10(&normalized),
        13 => validate_isbn13(&normalized),
        _ => false,
    }
}

/// True for exactly 10 or 13 characters of digits; an ISBN-10 may end in `X`.
///
/// No checksum is applied. This is how the search source picks the first
/// usable ISBN from a result's mixed identifier list.
pub fn is_isbn_shaped(s: &str) -> bool {
    let bytes = s.as_bytes();
    match bytes.len() {
        13 => bytes.iter().all(u8::is_ascii_digit),
        10 => {
            bytes[..9].iter().all(u8::is_ascii_digit)
                && (bytes[9].is_ascii_digit() || bytes[9] == b'X' || bytes[9] == b'x')
        }
        _ => false,
    }
}

/// Validate an EAN-13 barcode value (ISBN-13 uses the same check digit).
pub fn is_valid_ean13(code: &str) -> bool {
    code.len() == 13 && code.bytes().all(|b| b.is_ascii_digit()) && validate_isbn13(code)
}

/// Convert a valid ISBN-10 to its ISBN-13 (Bookland `978`) form.
pub fn isbn10_to_isbn13(isbn10: &str) -> Option<String> {
    let normalized = normalize_isbn(isbn10);
    if normalized.len() != 10 || !validate_isbn10(&normalized) {
        return None;
    }

    let body = format!("978{}", &normalized[..9]);
    let check = isbn13_check_digit(&body)?;
    Some(format!("{}{}", body, check))
}

fn validate_isbn10(isbn: &str) -> bool {
    let chars: Vec<char> = isbn.chars().collect();
    if chars.len() != 10 {
        return false;
    }

    let mut sum = 0u32;
    for (i, &c) in chars.iter().enumerate() {
        let value = match c {
            'X' if i == 9 => 10,
            d => match d.to_digit(10) {
                Some(v) => v,
                None => return false,
            },
        };
        sum += value * (10 - i as u32);
    }
    sum % 11 == 0
}

fn validate_isbn13(isbn: &str) -> bool {
    if isbn.len() != 13 {
        return false;
    }
    match isbn13_check_digit(&isbn[..12]) {
        Some(check) => isbn[12..].parse::<u32>().ok() == Some(check),
        None => false,
    }
}

/// Check digit for the first twelve digits of an ISBN-13 / EAN-13.
fn isbn13_check_digit(body: &str) -> Option<u32> {
    if body.len() != 12 {
        return None;
    }
    let mut sum = 0u32;
    for (i, c) in body.chars().enumerate() {
        let value = c.to_digit(10)?;
        sum += if i % 2 == 0 { value } else { value * 3 };
    }
    Some((10 - sum % 10) % 10)
}
