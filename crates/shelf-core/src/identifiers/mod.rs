//! ISBN handling
//!
//! - Normalizing user input into the query key sent to metadata sources
//! - Extracting ISBNs from free text (scanner frames, pasted strings)
//! - ISBN-10 / ISBN-13 / EAN-13 checksum validation

pub mod extractors;
pub mod validators;

pub use extractors::*;
pub use validators::*;
