//! shelf-core: core library for the shelf personal book catalogue
//!
//! This library provides:
//! - The canonical `BookRecord` model and checkout status
//! - ISBN normalization, extraction, and checksum validation
//! - Metadata sources (Open Library Books, Open Library Search, Google Books)
//! - Sequential-fallback ISBN lookup across those sources
//! - A barcode capture loop over pluggable devices and detectors
//! - The persisted, insertion-ordered book collection
//! - CSV export and TOML configuration

pub mod capture;
pub mod collection;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod http;
pub mod identifiers;
pub mod lookup;
pub mod sources;

// Re-export main types for convenience
pub use capture::{
    BarcodeDetector, BarcodeFormat, CancelFlag, Capabilities, CaptureDevice, DetectedBarcode,
    Facing, Frame, MediaStream, ScanEvent, ScanOutcome, ScanState, Scanner, StreamGuard,
    TextBarcodeDetector, WedgeCamera, WedgeFeed,
};
pub use collection::{Collection, FileStorage, MemoryStorage, SlotStorage, LIBRARY_SLOT};
pub use config::{Config, ConfigError};
pub use domain::{BookRecord, BookStatus, CoverSize, ImageLinks, ISBN_NOT_AVAILABLE, UNKNOWN_AUTHOR};
pub use error::{CaptureError, DetectionError, ExportError, LookupError, StoreError};
pub use export::{export_to_file, to_csv, DEFAULT_EXPORT_FILE_NAME};
pub use lookup::Lookup;
pub use sources::{BookSource, SourceError, SourceMetadata};

