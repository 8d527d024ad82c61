//! Error types for shelf-core
//!
//! Provider-level failures (`SourceError`, `HttpError`) never leave the
//! lookup orchestrator; the caller only ever sees `LookupError`.

use thiserror::Error;

/// Failure to turn an ISBN into a book record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The ISBN input was empty or otherwise unusable
    #[error("{0}")]
    Validation(String),

    /// Every metadata source was tried and none produced a record
    #[error("Book with ISBN {isbn} not found. It may be an unlisted edition.")]
    NotFound { isbn: String },
}

/// Failure of the barcode capture loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// No barcode detector is available in this build or environment
    #[error("Barcode scanning is not supported here. Use manual ISBN entry instead.")]
    Unsupported,

    /// The capture device could not be opened (permission denied, missing hardware)
    #[error("Could not access camera: {0}")]
    Camera(String),
}

/// A single detection attempt failed. Polling continues after this.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Barcode detection failed: {0}")]
pub struct DetectionError(pub String);

/// Failure reading or writing the persisted collection.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure producing or writing a CSV export.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for ExportError {
    fn from(e: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        ExportError::Io(e.into_error())
    }
}
