//! Domain models for shelf
//!
//! `BookRecord` is the canonical, provider-agnostic shape every metadata
//! source is normalized into, and the unit stored in the collection.

pub mod book;
pub mod status;

pub use book::*;
pub use status::*;
